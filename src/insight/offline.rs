use crate::insight::{InsightFailure, InsightService};
use async_trait::async_trait;

/// Answers every prompt with the same well-formed insight without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineService;

const ANSWER: &str = r#"{
    "summary": "Resumen generado sin conexión: los ingresos se mantienen estables.",
    "recommendations": [
        "Revisar las multas pendientes en cada sede.",
        "Promover el alquiler de espacios en periodos de baja demanda.",
        "Registrar el folio de cada recibo para facilitar la conciliación."
    ],
    "trend": "stable"
}"#;

#[async_trait]
impl InsightService for OfflineService {
    async fn generate(&self, _prompt: &str) -> Result<String, InsightFailure> {
        Ok(ANSWER.to_string())
    }
}
