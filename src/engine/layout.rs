use std::str::Split;

/// One wrapped line, positioned at its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidLine {
    /// Line text, including the trailing space the wrapper appends after
    /// every word.
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Greedy word wrap of `text` into lines no wider than `max_width`.
///
/// Words are split on single spaces. Each word is appended together with a
/// trailing space; when the grown line would measure wider than `max_width`
/// and already holds something, the line is emitted and the word starts the
/// next one, `line_height` lower. Whatever is left after the last word is
/// always emitted. A word wider than `max_width` on its own is placed alone
/// and overflows; it is never broken.
///
/// The returned iterator is lazy and single-pass: lines are measured as they
/// are pulled and nothing is cached between calls.
pub fn wrap_text<'a, M>(
    text: &'a str,
    x: f64,
    y: f64,
    max_width: f64,
    line_height: f64,
    measure: M,
) -> WrapText<'a, M>
where
    M: Fn(&str) -> f64,
{
    WrapText {
        words: text.split(' '),
        line: String::new(),
        x,
        baseline: y,
        max_width,
        line_height,
        measure,
        finished: false,
    }
}

pub struct WrapText<'a, M> {
    words: Split<'a, char>,
    line: String,
    x: f64,
    baseline: f64,
    max_width: f64,
    line_height: f64,
    measure: M,
    finished: bool,
}

impl<M> WrapText<'_, M> {
    fn emit(&mut self, next_line: String) -> LaidLine {
        let text = std::mem::replace(&mut self.line, next_line);
        let laid = LaidLine {
            text,
            x: self.x,
            y: self.baseline,
        };
        self.baseline += self.line_height;
        laid
    }
}

impl<M> Iterator for WrapText<'_, M>
where
    M: Fn(&str) -> f64,
{
    type Item = LaidLine;

    fn next(&mut self) -> Option<LaidLine> {
        if self.finished {
            return None;
        }

        while let Some(word) = self.words.next() {
            let candidate = format!("{}{word} ", self.line);
            if (self.measure)(&candidate) > self.max_width && !self.line.is_empty() {
                return Some(self.emit(format!("{word} ")));
            }
            self.line = candidate;
        }

        self.finished = true;
        Some(self.emit(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// 10 px per char.
    fn chars(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    fn texts(lines: &[LaidLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn short_text_is_one_line() {
        let lines: Vec<_> = wrap_text("L1", 95.0, 90.0, 310.0, 24.0, chars).collect();
        assert_eq!(
            lines,
            vec![LaidLine {
                text: "L1 ".into(),
                x: 95.0,
                y: 90.0
            }]
        );
    }

    #[test]
    fn breaks_before_word_that_overflows() {
        // "the quick " = 100 px, "the quick brown " = 160 px
        let lines: Vec<_> =
            wrap_text("the quick brown fox jumps", 0.0, 40.0, 100.0, 24.0, chars).collect();
        assert_eq!(texts(&lines), vec!["the quick ", "brown fox ", "jumps "]);
        assert_eq!(
            lines.iter().map(|l| l.y).collect::<Vec<_>>(),
            vec![40.0, 64.0, 88.0]
        );
    }

    #[test]
    fn oversized_word_stands_alone_unbroken() {
        let lines: Vec<_> =
            wrap_text("a Donaudampfschifffahrt b", 0.0, 0.0, 60.0, 10.0, chars).collect();
        assert_eq!(texts(&lines), vec!["a ", "Donaudampfschifffahrt ", "b "]);
    }

    #[test]
    fn oversized_first_word_is_not_preceded_by_empty_line() {
        let lines: Vec<_> = wrap_text("Donaudampfschiff", 0.0, 0.0, 50.0, 10.0, chars).collect();
        assert_eq!(texts(&lines), vec!["Donaudampfschiff "]);
    }

    #[test]
    fn empty_text_still_flushes_one_line() {
        let lines: Vec<_> = wrap_text("", 0.0, 0.0, 50.0, 10.0, chars).collect();
        assert_eq!(texts(&lines), vec![" "]);
    }

    #[test]
    fn is_single_pass() {
        let mut lines = wrap_text("a b", 0.0, 0.0, 100.0, 10.0, chars);
        assert!(lines.next().is_some());
        assert!(lines.next().is_none());
        assert!(lines.next().is_none());
    }

    #[test]
    fn lines_fit_unless_single_oversized_word() {
        let text = "Heute war ein langer Tag und ich habe am Fluss gesessen und \
                    den Schiffen zugesehen die langsam stromabwärts fuhren \
                    Kapitänskajütenfenster blieben dunkel";
        for max_width in [40.0, 80.0, 120.0, 200.0, 310.0] {
            for line in wrap_text(text, 0.0, 0.0, max_width, 24.0, chars) {
                let single_word = line.text.trim_end().split(' ').count() == 1;
                assert!(
                    chars(&line.text) <= max_width || single_word,
                    "{:?} overflows {max_width}",
                    line.text
                );
            }
        }
    }

    #[test]
    fn rejoined_lines_reproduce_words() {
        let text = "Liebes Tagebuch, heute habe ich endlich den alten Dachboden \
                    aufgeräumt und dabei eine Kiste voller Briefe gefunden";
        for max_width in [30.0, 90.0, 150.0, 400.0] {
            let joined: Vec<String> = wrap_text(text, 0.0, 0.0, max_width, 24.0, chars)
                .map(|l| l.text.strip_suffix(' ').unwrap_or(&l.text).to_owned())
                .collect();
            let rejoined = joined.join(" ");
            assert_eq!(
                rejoined.split_whitespace().collect::<Vec<_>>(),
                text.split_whitespace().collect::<Vec<_>>()
            );
        }
    }
}
