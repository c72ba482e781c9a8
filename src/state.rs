use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::OrmConn,
    printing::{DocumentPrinter, PickingListPrinter},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: AppConfig,
    pub printer: Arc<dyn DocumentPrinter>,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> Self {
        Self {
            orm,
            config,
            printer: Arc::new(PickingListPrinter),
        }
    }

    pub fn with_printer(mut self, printer: Arc<dyn DocumentPrinter>) -> Self {
        self.printer = printer;
        self
    }
}
