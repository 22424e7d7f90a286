// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing text resources.
//!
//! The controller only speaks in [`TextKey`]s; display strings live here and
//! can be swapped wholesale for another language. Templates use positional
//! `{0}` / `{1}` placeholders.

use std::collections::HashMap;

/// Every message and action label the bot can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    OnlyTextAllowed,
    Hello,
    EnterTasks,
    UnknownCommand,
    NoTasks,
    ListOfTasks,
    TaskCanceled,
    TaskDone,
    /// `{0}` = deleted task description.
    TaskDeleted,
    /// `{0}` = number of tasks admitted.
    TasksAdded,
    /// `{0}` = selected task description.
    TaskSelected,
    TaskNotFound,
    Fail,
    AvailableActions,
    TooManyTasks,
    /// `{0}` = total, `{1}` = completed, `{2}` = percentage.
    Summary,

    ActionAddTasks,
    ActionViewTasks,
    ActionFinishDay,

    ActionCompleteTask,
    ActionReturn,
    ActionDeleteTask,
}

/// Lookup table from [`TextKey`] to display string.
#[derive(Debug, Clone)]
pub struct TextResources {
    texts: HashMap<TextKey, String>,
}

impl TextResources {
    /// The built-in English resource set.
    pub fn english() -> Self {
        let texts = [
            (TextKey::OnlyTextAllowed, "Only text messages are supported."),
            (TextKey::Hello, "Hello! I track your tasks for the day."),
            (
                TextKey::EnterTasks,
                "Enter your tasks, one per line.",
            ),
            (TextKey::UnknownCommand, "Unknown command."),
            (TextKey::NoTasks, "You have no tasks."),
            (TextKey::ListOfTasks, "Your tasks:"),
            (TextKey::TaskCanceled, "Task deselected."),
            (TextKey::TaskDone, "Task completed."),
            (TextKey::TaskDeleted, "Task deleted: {0}"),
            (TextKey::TasksAdded, "Added {0} task(s)."),
            (TextKey::TaskSelected, "Selected task: <b>{0}</b>"),
            (TextKey::TaskNotFound, "Task not found."),
            (TextKey::Fail, "Something went wrong. Please try again."),
            (TextKey::AvailableActions, "<b>Available actions:</b>"),
            (
                TextKey::TooManyTasks,
                "Too many tasks. Finish some before adding more.",
            ),
            (
                TextKey::Summary,
                "<b>Daily summary</b>\n\nTotal tasks: {0}\nCompleted: {1}\nCompletion: {2}%\n\nIncomplete tasks carry over to the next day.",
            ),
            (TextKey::ActionAddTasks, "Add tasks"),
            (TextKey::ActionViewTasks, "View tasks"),
            (TextKey::ActionFinishDay, "Finish day"),
            (TextKey::ActionCompleteTask, "Complete task"),
            (TextKey::ActionReturn, "Return"),
            (TextKey::ActionDeleteTask, "Delete task"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();
        Self { texts }
    }

    /// The plain string for `key`. Keys are a closed enum so a miss is a
    /// construction bug; a placeholder is returned to keep the bot
    /// responding.
    pub fn get(&self, key: TextKey) -> &str {
        self.texts
            .get(&key)
            .map(String::as_str)
            .unwrap_or("<missing text resource>")
    }

    /// Renders `key` with positional `{0}`, `{1}`, ... substitutions.
    pub fn format(&self, key: TextKey, args: &[&dyn std::fmt::Display]) -> String {
        let mut out = self.get(key).to_string();
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), &arg.to_string());
        }
        out
    }

    /// Case-insensitive full-text match against the label for `key`.
    pub fn matches(&self, key: TextKey, text: &str) -> bool {
        text.eq_ignore_ascii_case(self.get(key))
    }
}

impl Default for TextResources {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_resolves() {
        let res = TextResources::english();
        for key in [
            TextKey::OnlyTextAllowed,
            TextKey::Hello,
            TextKey::EnterTasks,
            TextKey::UnknownCommand,
            TextKey::NoTasks,
            TextKey::ListOfTasks,
            TextKey::TaskCanceled,
            TextKey::TaskDone,
            TextKey::TaskDeleted,
            TextKey::TasksAdded,
            TextKey::TaskSelected,
            TextKey::TaskNotFound,
            TextKey::Fail,
            TextKey::AvailableActions,
            TextKey::TooManyTasks,
            TextKey::Summary,
            TextKey::ActionAddTasks,
            TextKey::ActionViewTasks,
            TextKey::ActionFinishDay,
            TextKey::ActionCompleteTask,
            TextKey::ActionReturn,
            TextKey::ActionDeleteTask,
        ] {
            assert_ne!(res.get(key), "<missing text resource>");
        }
    }

    #[test]
    fn positional_substitution() {
        let res = TextResources::english();
        assert_eq!(res.format(TextKey::TasksAdded, &[&3]), "Added 3 task(s).");
        let summary = res.format(TextKey::Summary, &[&4, &2, &50]);
        assert!(summary.contains("Total tasks: 4"));
        assert!(summary.contains("Completed: 2"));
        assert!(summary.contains("Completion: 50%"));
    }

    #[test]
    fn label_match_is_case_insensitive_and_exact() {
        let res = TextResources::english();
        assert!(res.matches(TextKey::ActionAddTasks, "add tasks"));
        assert!(res.matches(TextKey::ActionAddTasks, "ADD TASKS"));
        assert!(!res.matches(TextKey::ActionAddTasks, "add tasks please"));
        assert!(!res.matches(TextKey::ActionAddTasks, "add"));
    }
}
