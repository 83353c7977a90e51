use itertools::Itertools;

use crate::Void;

/// Renders a value in a compact, human readable way. This is used for logging and for
/// displaying words, experiments and observation tables.
pub trait Show {
    /// Returns a compact string representation of `self`.
    fn show(&self) -> String;

    /// Renders a collection of values. Symbols override this to print words without
    /// separators.
    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        format!("[{}]", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

/// This method should display the time in a sensible format. If it is less than a second, it should
/// only display the milliseconds and microseconds. If it is less than a minute, it should display
/// the seconds and milliseconds. Anything longer is displayed in minutes and seconds.
pub fn show_duration(duration: std::time::Duration) -> String {
    let ms = duration.as_millis();
    let us = duration.as_micros();
    let s = duration.as_secs();
    let m = s / 60;

    if m > 0 {
        format!("{}m {}s", m, s % 60)
    } else if s > 0 {
        format!("{}s {}ms", s, ms % 1000)
    } else if ms > 0 {
        format!("{}ms {}us", ms, us % 1000)
    } else {
        format!("{}us", us)
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        let word: String = iter.into_iter().collect();
        if word.is_empty() {
            "ε".to_string()
        } else {
            word
        }
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        let word = iter.into_iter().join(".");
        if word.is_empty() {
            "ε".to_string()
        } else {
            word
        }
    }
}

impl Show for u8 {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for bool {
    fn show(&self) -> String {
        let out = if *self { "1" } else { "0" };
        out.to_string()
    }
}

impl Show for Void {
    fn show(&self) -> String {
        "#".to_string()
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self)
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self)
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(self)
    }
}
