use colored::*;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

/// Line-based prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks a yes/no question. An empty answer picks `default`.
    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.ask(&format!("{} {} ", question.bold(), hint))?;

        Ok(match answer.to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    /// Prints `prompt` and reads one trimmed line. End of input reads as empty.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut input = String::new();
        self.input.read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Lists `items` numbered from 1 and reads a selection such as `1,3-5`.
    /// An empty answer selects everything.
    pub fn select<T: AsRef<str>>(&mut self, header: &str, items: &[T]) -> io::Result<BTreeSet<usize>> {
        writeln!(self.output, "{}", header.bold())?;
        for (index, item) in items.iter().enumerate() {
            writeln!(self.output, "  {:>3}. {}", index + 1, item.as_ref())?;
        }

        loop {
            let answer = self.ask("Files to migrate (e.g. 1,3-5; empty for all): ")?;
            if answer.is_empty() {
                return Ok((0..items.len()).collect());
            }
            match parse_selection(&answer, items.len()) {
                Ok(selection) => return Ok(selection),
                Err(message) => writeln!(self.output, "{} {}", "✗".red(), message)?,
            }
        }
    }
}

/// Parses `1,3-5` style input into zero-based indices below `len`.
pub fn parse_selection(input: &str, len: usize) -> Result<BTreeSet<usize>, String> {
    let parse = |token: &str| -> Result<usize, String> {
        let number: usize = token
            .trim()
            .parse()
            .map_err(|_| format!("`{}` is not a number", token.trim()))?;
        if number == 0 || number > len {
            return Err(format!("{} is out of range 1-{}", number, len));
        }
        Ok(number - 1)
    };

    let mut selection = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("range `{}` is reversed", part));
                }
                selection.extend(start..=end);
            }
            None => {
                selection.insert(parse(part)?);
            }
        }
    }

    if selection.is_empty() {
        return Err("nothing selected".to_string());
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_confirm_answers() {
        assert!(prompter("\n").confirm("Go?", true).unwrap());
        assert!(!prompter("\n").confirm("Go?", false).unwrap());
        assert!(prompter("YES\n").confirm("Go?", false).unwrap());
        assert!(!prompter("n\n").confirm("Go?", true).unwrap());
        assert!(!prompter("maybe\n").confirm("Go?", true).unwrap());
    }

    #[test]
    fn test_confirm_prints_hint() {
        let mut p = prompter("y\n");
        p.confirm("Create a backup?", true).unwrap();
        assert_eq!(String::from_utf8(p.output).unwrap(), "Create a backup? [Y/n] ");
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("1, 3-4", 5).unwrap(),
            BTreeSet::from([0, 2, 3])
        );
        assert_eq!(parse_selection("2,2", 2).unwrap(), BTreeSet::from([1]));
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("3-1", 3).is_err());
        assert!(parse_selection("a", 3).is_err());
        assert!(parse_selection(" , ", 3).is_err());
    }

    #[test]
    fn test_select_retries_after_bad_input() {
        let mut p = prompter("9\n2\n");
        let selection = p.select("Affected files", &["a.ts", "b.html"]).unwrap();
        assert_eq!(selection, BTreeSet::from([1]));
        let output = String::from_utf8(p.output).unwrap();
        assert!(output.contains("    1. a.ts"));
        assert!(output.contains("9 is out of range 1-2"));
    }

    #[test]
    fn test_select_empty_means_all() {
        let mut p = prompter("\n");
        let selection = p.select("Affected files", &["a", "b", "c"]).unwrap();
        assert_eq!(selection, BTreeSet::from([0, 1, 2]));
    }
}
