pub mod error;
pub mod model;
pub mod service;

pub use error::HistoryServiceError;
pub use model::{ConversionRecord, HistoryTotals, NewConversionRecord, VoiceCount};
pub use service::{
    ClearHistoryResponse, DeleteConversionResponse, HistoryPage, HistoryService,
    HistoryServiceApi, HistoryStats,
};
