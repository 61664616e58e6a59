use std::time::Duration;

use thiserror::Error;

use crate::mapping_store::MappingsPayload;
use crate::settings::CameraSettings;
use crate::snapshot::RecognitionResponse;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Error HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("El backend respondió {status} en {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
}

/// Método del endpoint de reconocimiento. El backend lo cambió entre
/// revisiones, así que se deja configurable en vez de fijarlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// URL base del backend de reconocimiento
    pub base_url: String,
    /// Tiempo máximo por petición
    pub timeout: Duration,
    /// Método del endpoint de reconocimiento
    pub recognition_method: RecognitionMethod,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(5),
            recognition_method: RecognitionMethod::Post,
        }
    }
}

/// Cliente HTTP bloqueante del backend de reconocimiento.
/// Cada método cubre un endpoint; ninguno deja escapar un panic por fallos
/// de red: todo error vuelve como `BackendError` recuperable.
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn check_status(
        endpoint: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        if !response.status().is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: response.status(),
            });
        }
        Ok(response)
    }

    /// GET /mappings → las tres colecciones
    pub fn fetch_mappings(&self) -> Result<MappingsPayload, BackendError> {
        let endpoint = self.url("/mappings");
        let response = self.client.get(&endpoint).send()?;
        Ok(Self::check_status(&endpoint, response)?.json()?)
    }

    /// POST /update-mappings con las tres colecciones en un solo cuerpo.
    /// La respuesta es solo informativa; se devuelve para mostrarla.
    pub fn update_mappings(
        &self,
        payload: &MappingsPayload,
    ) -> Result<serde_json::Value, BackendError> {
        let endpoint = self.url("/update-mappings");
        let response = self.client.post(&endpoint).json(payload).send()?;
        Ok(Self::check_status(&endpoint, response)?.json()?)
    }

    /// Consulta el endpoint de reconocimiento con el método configurado
    pub fn fetch_recognition(&self) -> Result<RecognitionResponse, BackendError> {
        let endpoint = self.url("/recognize_gesture");
        let request = match self.config.recognition_method {
            RecognitionMethod::Get => self.client.get(&endpoint),
            RecognitionMethod::Post => self.client.post(&endpoint),
        };
        let response = request.send()?;
        Ok(Self::check_status(&endpoint, response)?.json()?)
    }

    /// GET /settings → configuración de captura actual
    pub fn fetch_settings(&self) -> Result<CameraSettings, BackendError> {
        let endpoint = self.url("/settings");
        let response = self.client.get(&endpoint).send()?;
        Ok(Self::check_status(&endpoint, response)?.json()?)
    }

    /// POST /update-settings; la respuesta es informativa
    pub fn update_settings(
        &self,
        settings: &CameraSettings,
    ) -> Result<serde_json::Value, BackendError> {
        let endpoint = self.url("/update-settings");
        let response = self.client.post(&endpoint).json(settings).send()?;
        Ok(Self::check_status(&endpoint, response)?.json()?)
    }

    /// URL del stream MJPEG; el panel no lo decodifica, solo lo señala
    pub fn video_feed_url(&self) -> String {
        self.url("/video_feed")
    }

    /// Despierta al backend con una consulta de reconocimiento descartable
    /// (el botón "Start Feed" original hacía exactamente esto)
    pub fn warm_up(&self) -> Result<(), BackendError> {
        self.fetch_recognition().map(|_| ())
    }
}
