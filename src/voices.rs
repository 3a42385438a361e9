use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The voice pinned to the top of its group and selected by default.
pub const DEFAULT_VOICE_ID: &str = "af_heart";

/// Voice metadata published by the producer once the model is ready.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub gender: String,
}

impl Voice {
    /// Category prefix of the voice id (e.g. "af" for "af_heart").
    pub fn category(&self) -> &str {
        self.id.split('_').next().unwrap_or(&self.id)
    }
}

/// A group of voices sharing a category and gender, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceGroup {
    /// Display label, e.g. "Female Voices (AF)".
    pub label: String,
    pub voices: Vec<Voice>,
}

/// Catalog view of the available voices, with the default selection resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCatalog {
    pub groups: Vec<VoiceGroup>,
    /// Id of the voice a consumer should preselect.
    pub selected: Option<String>,
}

impl VoiceCatalog {
    /// Group voices by category and gender, sorted alphabetically.
    ///
    /// Voices within a group are sorted by name. The `af_heart` voice, when
    /// present, is pulled out of the ordinary sort and pinned to the top of
    /// the AF female group as the default selection; otherwise the first
    /// voice overall becomes the default.
    pub fn build(voices: &[Voice]) -> Self {
        let mut heart: Option<Voice> = None;
        let mut groups: BTreeMap<String, Vec<Voice>> = BTreeMap::new();

        for voice in voices {
            if voice.id == DEFAULT_VOICE_ID {
                heart = Some(voice.clone());
                continue;
            }
            let key = format!("{} - {}", voice.category(), voice.gender);
            groups.entry(key).or_default().push(voice.clone());
        }

        let mut out = Vec::new();
        let mut selected = heart.as_ref().map(|v| v.id.clone());

        for (key, mut members) in groups {
            members.sort_by(|a, b| a.name.cmp(&b.name));

            let (category, gender) = key.split_once(" - ").unwrap_or((key.as_str(), ""));
            let label = format!("{} Voices ({})", gender, category.to_uppercase());

            if category == "af" && gender == "Female" {
                if let Some(heart_voice) = heart.take() {
                    members.insert(0, heart_voice);
                }
            }

            if selected.is_none() {
                if let Some(first) = members.first() {
                    selected = Some(first.id.clone());
                }
            }

            out.push(VoiceGroup {
                label,
                voices: members,
            });
        }

        // Heart voice present but no AF female group to host it: give it its own.
        if let Some(heart_voice) = heart {
            out.insert(
                0,
                VoiceGroup {
                    label: "Female Voices (AF)".to_string(),
                    voices: vec![heart_voice],
                },
            );
        }

        Self {
            groups: out,
            selected,
        }
    }

    /// Total number of voices across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.voices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
