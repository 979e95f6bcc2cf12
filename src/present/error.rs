use thiserror::Error;

use crate::{
    client::error::FetchError, domain::category::ChartCategory,
    visualize::VisualizationError,
};

/// Reasons a render pass shows a message instead of a table or chart.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Error al obtener datos: {0}")]
    Transport(#[from] FetchError),

    #[error("No se encontraron datos para la categoría seleccionada: {}.", .category.label())]
    EmptyResult { category: ChartCategory },

    #[error("No hay datos numéricos suficientes para generar un mapa de calor.")]
    InsufficientData,

    #[error("Los gráficos solo están disponibles para Canciones, no para {}.", .0.label())]
    UnsupportedCategory(ChartCategory),
}

impl From<VisualizationError> for ViewError {
    fn from(err: VisualizationError) -> Self {
        match err {
            VisualizationError::InsufficientData => ViewError::InsufficientData,
            VisualizationError::UnsupportedCategory(category) => {
                ViewError::UnsupportedCategory(category)
            }
        }
    }
}

impl ViewError {
    /// Whether the table can still be shown alongside this error.
    pub fn is_chart_only(&self) -> bool {
        matches!(
            self,
            ViewError::InsufficientData | ViewError::UnsupportedCategory(_)
        )
    }
}
