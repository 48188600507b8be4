//! Emotion labels and the ordered score vector produced per clip.

use std::collections::HashMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of emotion dimensions the network predicts.
pub const EMOTION_COUNT: usize = 8;

/// Emotion dimensions, in the network's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Valence,
    Energy,
    Tension,
    Anger,
    Fear,
    Happy,
    Sad,
    Tender,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; EMOTION_COUNT] = [
        EmotionLabel::Valence,
        EmotionLabel::Energy,
        EmotionLabel::Tension,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Tender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Valence => "valence",
            EmotionLabel::Energy => "energy",
            EmotionLabel::Tension => "tension",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Tender => "tender",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == name)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One score per [`EmotionLabel`], serialized as a name → score map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionVector([f32; EMOTION_COUNT]);

impl EmotionVector {
    pub fn new(scores: [f32; EMOTION_COUNT]) -> Self {
        Self(scores)
    }

    pub fn get(&self, label: EmotionLabel) -> f32 {
        self.0[label.index()]
    }

    pub fn scores(&self) -> &[f32; EMOTION_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        EmotionLabel::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self(self.0.map(&mut f))
    }
}

impl From<[f32; EMOTION_COUNT]> for EmotionVector {
    fn from(scores: [f32; EMOTION_COUNT]) -> Self {
        Self(scores)
    }
}

impl Serialize for EmotionVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EMOTION_COUNT))?;
        for (label, score) in self.iter() {
            map.serialize_entry(label.as_str(), &score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmotionVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, f32>::deserialize(deserializer)?;
        let mut scores = [None; EMOTION_COUNT];
        for (name, score) in raw {
            let label = EmotionLabel::from_name(&name)
                .ok_or_else(|| D::Error::custom(format!("unknown emotion '{name}'")))?;
            scores[label.index()] = Some(score);
        }
        let mut out = [0.0_f32; EMOTION_COUNT];
        for label in EmotionLabel::ALL {
            out[label.index()] = scores[label.index()]
                .ok_or_else(|| D::Error::custom(format!("missing emotion '{}'", label.as_str())))?;
        }
        Ok(Self(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_network_output_order() {
        let names: Vec<&str> = EmotionLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            ["valence", "energy", "tension", "anger", "fear", "happy", "sad", "tender"]
        );
        for (idx, label) in EmotionLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), idx);
        }
    }

    #[test]
    fn serializes_as_ordered_named_map() {
        let vector = EmotionVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 7.5]);
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(
            json,
            r#"{"valence":1.0,"energy":2.0,"tension":3.0,"anger":4.0,"fear":5.0,"happy":6.0,"sad":7.0,"tender":7.5}"#
        );
        let back: EmotionVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
    }

    #[test]
    fn unknown_names_fail_to_deserialize() {
        let err = serde_json::from_str::<EmotionVector>(r#"{"joy":1.0}"#).unwrap_err();
        assert!(err.to_string().contains("joy"));
    }

    #[test]
    fn missing_labels_fail_to_deserialize() {
        let json = r#"{"valence":1.0,"energy":2.0,"tension":3.0,"anger":4.0,"fear":5.0,"happy":6.0,"sad":7.0}"#;
        let err = serde_json::from_str::<EmotionVector>(json).unwrap_err();
        assert!(err.to_string().contains("missing emotion 'tender'"), "{err}");

        let err = serde_json::from_str::<EmotionVector>("{}").unwrap_err();
        assert!(err.to_string().contains("missing emotion 'valence'"), "{err}");
    }
}
