use crate::core::evaluator;
use crate::domain::model::{InputEvent, ERROR_MARKER};

/// 清除後的顯示值
pub const PLACEHOLDER: &str = "0";

/// Owns the display buffer and turns button events into buffer edits.
///
/// Callers must serialize `handle_input`; the controller takes `&mut self`
/// and does no locking of its own.
#[derive(Debug, Clone)]
pub struct InputBufferController {
    buffer: String,
}

impl InputBufferController {
    pub fn new() -> Self {
        Self {
            buffer: PLACEHOLDER.to_string(),
        }
    }

    pub fn current_display(&self) -> &str {
        &self.buffer
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Clear => self.reset(),
            InputEvent::Backspace => self.backspace(),
            InputEvent::Percent => {
                self.buffer.push('%');
                self.calculate();
            }
            InputEvent::Equals => self.calculate(),
            InputEvent::Literal(label) => self.append(&label),
        }
        tracing::trace!("Display buffer is now {:?}", self.buffer);
    }

    fn reset(&mut self) {
        self.buffer = PLACEHOLDER.to_string();
    }

    fn backspace(&mut self) {
        // "Error" 不是使用者輸入的內容，整個清掉
        if self.buffer == ERROR_MARKER {
            self.reset();
            return;
        }
        self.buffer.pop();
        if self.buffer.is_empty() {
            self.reset();
        }
    }

    fn append(&mut self, label: &str) {
        if label.is_empty() {
            return;
        }
        if self.buffer == PLACEHOLDER || self.buffer == ERROR_MARKER {
            self.buffer = label.to_string();
        } else {
            self.buffer.push_str(label);
        }
    }

    fn calculate(&mut self) {
        let result = evaluator::calculate(&self.buffer);
        tracing::debug!("Evaluated {:?} = {}", self.buffer, result);
        self.buffer = result;
    }
}

impl Default for InputBufferController {
    fn default() -> Self {
        Self::new()
    }
}
