use crate::core::controller::InputBufferController;
use crate::core::conversion;
use crate::core::{ConversionData, ConversionMode, InputEvent};
use crate::utils::error::Result;
use tokio::sync::watch;

/// The UI-facing coordinator: the single writer of the display buffer.
///
/// The exchange rate is read from the watch slot at render time, so a rate
/// arriving while the user types simply shows up on the next render.
pub struct CalculatorSession {
    controller: InputBufferController,
    mode: ConversionMode,
    rates: watch::Receiver<ConversionData>,
    from: String,
    to: String,
}

impl CalculatorSession {
    pub fn new(
        from: &str,
        to: &str,
        rates: watch::Receiver<ConversionData>,
        mode: ConversionMode,
    ) -> Self {
        Self {
            controller: InputBufferController::new(),
            mode,
            rates,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Session with a fixed rate and no background feed.
    pub fn with_rate(from: &str, to: &str, data: ConversionData, mode: ConversionMode) -> Self {
        let (_sender, receiver) = watch::channel(data);
        Self::new(from, to, receiver, mode)
    }

    pub fn press(&mut self, label: &str) -> Result<()> {
        let event = label.parse::<InputEvent>()?;
        self.handle(event);
        Ok(())
    }

    /// 輸入一段文字：可辨識的按鍵標籤直接使用，其餘逐字元拆成按鍵。
    /// 任何未知字元都會讓整段輸入被拒絕，緩衝區保持不變。
    pub fn enter(&mut self, input: &str) -> Result<()> {
        for event in Self::events(input)? {
            self.handle(event);
        }
        Ok(())
    }

    /// One-shot calculation: enter `input` and make sure it ends evaluated.
    /// Input already ending in `=` or `%` is not evaluated a second time.
    pub fn evaluate_once(&mut self, input: &str) -> Result<&str> {
        let mut events = Self::events(input)?;
        if !matches!(
            events.last(),
            Some(InputEvent::Equals) | Some(InputEvent::Percent)
        ) {
            events.push(InputEvent::Equals);
        }

        for event in events {
            self.handle(event);
        }
        Ok(self.display())
    }

    fn events(input: &str) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        for token in input.split_whitespace() {
            match token.parse::<InputEvent>() {
                Ok(event) => events.push(event),
                Err(_) => {
                    for c in token.chars() {
                        events.push(c.to_string().parse::<InputEvent>()?);
                    }
                }
            }
        }
        Ok(events)
    }

    pub fn handle(&mut self, event: InputEvent) {
        self.controller.handle_input(event);
    }

    pub fn display(&self) -> &str {
        self.controller.current_display()
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ConversionMode) {
        self.mode = mode;
    }

    pub fn cycle_mode(&mut self) -> ConversionMode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn mode_label(&self) -> String {
        self.mode.label(&self.from, &self.to)
    }

    pub fn rate(&self) -> ConversionData {
        self.rates.borrow().clone()
    }

    pub fn converted(&self) -> Option<String> {
        let data = self.rates.borrow();
        conversion::project(self.display(), &data.rate, self.mode)
    }

    /// Currency of the `converted()` value.
    pub fn output_currency(&self) -> Option<&str> {
        match self.mode {
            ConversionMode::Off => None,
            ConversionMode::SourceToTarget => Some(&self.to),
            ConversionMode::TargetToSource => Some(&self.from),
        }
    }

    /// Currency of the value being typed.
    pub fn input_currency(&self) -> Option<&str> {
        match self.mode {
            ConversionMode::Off => None,
            ConversionMode::SourceToTarget => Some(&self.from),
            ConversionMode::TargetToSource => Some(&self.to),
        }
    }

    pub fn rate_banner(&self) -> String {
        let data = self.rates.borrow();
        format!(
            "1 {} = {} {}",
            self.from,
            conversion::whole_number(data.rate.value()),
            self.to
        )
    }

    pub fn date_line(&self) -> String {
        let data = self.rates.borrow();
        if data.rate.date().is_empty() {
            "Loading...".to_string()
        } else {
            data.rate.date().to_string()
        }
    }
}
