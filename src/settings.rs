use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("bounded_ratio debe ser ≥ 0 (recibido {0})")]
    NegativeRatio(f32),
}

/// Espacio de color que usa el segmentador de piel del backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "HSV")]
    Hsv,
    #[serde(rename = "YcRcb")]
    YcRcb,
}

/// Configuración de captura del backend: índice de cámara, modo de color y
/// ratio de expansión del recuadro de la mano. El panel solo la lee, la
/// muestra y la reenvía; quien la aplica es el backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub camera: u32,
    pub color_mode: ColorMode,
    pub bounded_ratio: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            camera: 0,
            color_mode: ColorMode::Hsv,
            bounded_ratio: 0.25,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bounded_ratio < 0.0 {
            return Err(SettingsError::NegativeRatio(self.bounded_ratio));
        }
        Ok(())
    }
}
