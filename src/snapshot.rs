use serde::Deserialize;

use crate::types::NO_DETECTION;

/// Respuesta del endpoint de reconocimiento. Todos los campos son opcionales:
/// el backend omite (o manda vacío) lo que no detectó en ese instante.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub gesture: Option<String>,
    #[serde(default)]
    pub motion_detected: Option<String>,
    #[serde(default)]
    pub motion_last_detected: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Instantánea estable del estado de reconocimiento.
///
/// Política de mezcla: un campo presente y no vacío en la respuesta
/// sobreescribe; un campo ausente o vacío retiene el valor anterior.
/// Así una respuesta parcial nunca deja la vista en blanco.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSnapshot {
    pub gesture: String,
    pub motion_detected: String,
    pub motion_last_detected: String,
    pub direction: String,
    applied_seq: u64,
}

impl Default for RecognitionSnapshot {
    fn default() -> Self {
        Self {
            gesture: NO_DETECTION.to_string(),
            motion_detected: NO_DETECTION.to_string(),
            motion_last_detected: NO_DETECTION.to_string(),
            direction: NO_DETECTION.to_string(),
            applied_seq: 0,
        }
    }
}

impl RecognitionSnapshot {
    /// Aplica una respuesta etiquetada con su número de tick.
    /// Una respuesta más vieja que la última aplicada se descarta entera;
    /// retorna false en ese caso.
    pub fn apply(&mut self, seq: u64, response: &RecognitionResponse) -> bool {
        if seq < self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.merge(response);
        true
    }

    /// Mezcla campo a campo bajo la política de retención
    pub fn merge(&mut self, response: &RecognitionResponse) {
        merge_field(&mut self.gesture, &response.gesture);
        merge_field(&mut self.motion_detected, &response.motion_detected);
        merge_field(&mut self.motion_last_detected, &response.motion_last_detected);
        merge_field(&mut self.direction, &response.direction);
    }

    /// Número de tick de la última respuesta aplicada
    pub fn last_applied_seq(&self) -> u64 {
        self.applied_seq
    }
}

fn merge_field(current: &mut String, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *current = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(gesture: &str, motion: &str) -> RecognitionResponse {
        RecognitionResponse {
            gesture: Some(gesture.to_string()),
            motion_detected: Some(motion.to_string()),
            ..RecognitionResponse::default()
        }
    }

    #[test]
    fn starts_with_no_detection_sentinels() {
        let snapshot = RecognitionSnapshot::default();
        assert_eq!(snapshot.gesture, NO_DETECTION);
        assert_eq!(snapshot.direction, NO_DETECTION);
        assert_eq!(snapshot.last_applied_seq(), 0);
    }

    #[test]
    fn retain_on_partial() {
        let mut snapshot = RecognitionSnapshot::default();
        snapshot.merge(&response("fist", "UP"));

        // Campo vacío no sobreescribe; campo presente sí
        snapshot.merge(&response("", "DOWN"));
        assert_eq!(snapshot.gesture, "fist");
        assert_eq!(snapshot.motion_detected, "DOWN");
    }

    #[test]
    fn absent_fields_retain_previous_value() {
        let mut snapshot = RecognitionSnapshot::default();
        snapshot.merge(&response("open_palm", "LEFT"));

        snapshot.merge(&RecognitionResponse::default());
        assert_eq!(snapshot.gesture, "open_palm");
        assert_eq!(snapshot.motion_detected, "LEFT");
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut snapshot = RecognitionSnapshot::default();
        assert!(snapshot.apply(5, &response("fist", "UP")));

        // Una respuesta del tick 3 llega tarde: no debe pisar al tick 5
        assert!(!snapshot.apply(3, &response("ok_sign", "DOWN")));
        assert_eq!(snapshot.gesture, "fist");
        assert_eq!(snapshot.last_applied_seq(), 5);
    }

    #[test]
    fn json_with_null_and_missing_fields_decodes() {
        let decoded: RecognitionResponse =
            serde_json::from_str(r#"{"gesture":"fist","direction":null}"#).unwrap();
        assert_eq!(decoded.gesture.as_deref(), Some("fist"));
        assert!(decoded.direction.is_none());
        assert!(decoded.motion_detected.is_none());
    }
}
