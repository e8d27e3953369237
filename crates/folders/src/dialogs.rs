//! Blocking user dialogs
//!
//! The browser shell maps these onto `alert`, `confirm` and `prompt`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Blocking alerts, confirmations and prompts
pub trait Dialogs {
    fn alert(&self, message: &str);

    /// Ask a yes/no question; `false` when dismissed
    fn confirm(&self, message: &str) -> bool;

    /// Ask for a line of text; `None` when cancelled
    fn prompt(&self, message: &str) -> Option<String>;
}

#[derive(Default)]
struct Script {
    alerts: Vec<String>,
    confirms: VecDeque<bool>,
    prompts: VecDeque<Option<String>>,
}

/// Dialogs answered from a script, recording every alert
///
/// Unscripted confirmations answer `false` and unscripted prompts are
/// cancelled.
#[derive(Clone, Default)]
pub struct ScriptedDialogs {
    script: Rc<RefCell<Script>>,
}

impl ScriptedDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next confirmation
    pub fn answer_confirm(&self, answer: bool) {
        self.script.borrow_mut().confirms.push_back(answer);
    }

    /// Queue the answer to the next prompt
    pub fn answer_prompt(&self, answer: Option<&str>) {
        self.script
            .borrow_mut()
            .prompts
            .push_back(answer.map(str::to_string));
    }

    /// Alerts shown so far
    pub fn alerts(&self) -> Vec<String> {
        self.script.borrow().alerts.clone()
    }
}

impl Dialogs for ScriptedDialogs {
    fn alert(&self, message: &str) {
        self.script.borrow_mut().alerts.push(message.to_string());
    }

    fn confirm(&self, _message: &str) -> bool {
        self.script.borrow_mut().confirms.pop_front().unwrap_or(false)
    }

    fn prompt(&self, _message: &str) -> Option<String> {
        self.script.borrow_mut().prompts.pop_front().flatten()
    }
}
