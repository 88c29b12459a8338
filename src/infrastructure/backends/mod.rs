pub mod gemini;
#[cfg(test)]
pub mod scripted;

use crate::domain::models::BackendBox;

pub struct BackendManager {}

impl BackendManager {
    pub fn get() -> BackendBox {
        return Box::<gemini::Gemini>::default();
    }
}
