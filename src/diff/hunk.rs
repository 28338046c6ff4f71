use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, separated_pair},
};
use serde::Serialize;
use std::fmt;

/// Start line and line count of one side of a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub len: u32,
}

/// A removed or added line with its line number in the old or new file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// Deleted line with old line number and content
    Delete { old_line: u32, content: &'a str },
    /// Added line with new line number and content
    Add { new_line: u32, content: &'a str },
}

/// A single hunk from a unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hunk {
    /// Range descriptor between the `@@` markers, e.g. `-12,5 +12,7`
    pub header: String,
    /// Free text after the closing `@@`
    pub context: String,
    /// Header line and body, verbatim
    pub content: String,
    pub removed_lines: Vec<String>,
    pub added_lines: Vec<String>,
}

impl Hunk {
    /// Split a unified diff into its hunks, in source order.
    ///
    /// Everything before the first `@@ ` line (`diff --git`, `index`, `---`,
    /// `+++`) is skipped. A diff without hunk headers yields no hunks.
    ///
    /// ```
    /// use repo_decode::diff::Hunk;
    ///
    /// let hunks = Hunk::scan("--- a/f\n+++ b/f\n@@ -1 +1 @@ fn main()\n-old\n+new\n");
    /// assert_eq!(hunks.len(), 1);
    /// assert_eq!(hunks[0].header, "-1 +1");
    /// assert_eq!(hunks[0].context, "fn main()");
    /// assert_eq!(hunks[0].removed_lines, vec!["old"]);
    /// assert_eq!(hunks[0].added_lines, vec!["new"]);
    /// ```
    pub fn scan(raw_diff: &str) -> Vec<Self> {
        let mut hunks = Vec::new();
        let mut current: Option<Hunk> = None;

        for line in raw_diff.lines() {
            if let Some(hunk) = Self::open(line) {
                hunks.extend(current.replace(hunk));
            } else if let Some(hunk) = current.as_mut() {
                hunk.push_line(line);
            }
        }

        hunks.extend(current);
        hunks
    }

    /// Start a hunk from its header line, `None` if the line is not one
    fn open(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("@@ ")?;
        let (header, context) = match rest.split_once("@@") {
            Some((header, context)) => (header, context.strip_prefix(' ').unwrap_or(context)),
            None => (rest, ""),
        };

        Some(Hunk {
            header: header.trim().to_string(),
            context: context.to_string(),
            content: line.to_string(),
            ..Default::default()
        })
    }

    fn push_line(&mut self, line: &str) {
        self.content.push('\n');
        self.content.push_str(line);

        if let Some(removed) = line.strip_prefix('-') {
            self.removed_lines.push(removed.to_string());
        } else if let Some(added) = line.strip_prefix('+') {
            self.added_lines.push(added.to_string());
        }
        // Context and "\ No newline" lines only live in the content
    }

    /// Old and new ranges decoded from the header, `None` when the header
    /// is not of the `-start[,len] +start[,len]` form.
    pub fn ranges(&self) -> Option<(LineRange, LineRange)> {
        header_ranges(&self.header).ok().map(|(_, ranges)| ranges)
    }

    /// Body lines of the hunk (content without the header line)
    pub fn body(&self) -> impl Iterator<Item = &str> {
        self.content.lines().skip(1)
    }

    /// Removed and added lines with their line numbers, in hunk order.
    ///
    /// Empty when the header ranges cannot be decoded, or when a line number
    /// would run past `u32::MAX`.
    pub fn numbered_lines(&self) -> Vec<DiffLine<'_>> {
        self.try_numbered_lines().unwrap_or_default()
    }

    fn try_numbered_lines(&self) -> Option<Vec<DiffLine<'_>>> {
        let (old, new) = self.ranges()?;

        let mut old_line = u64::from(old.start);
        let mut new_line = u64::from(new.start);
        let mut lines = Vec::new();

        for line in self.body() {
            if let Some(content) = line.strip_prefix('-') {
                lines.push(DiffLine::Delete {
                    old_line: u32::try_from(old_line).ok()?,
                    content,
                });
                old_line += 1;
            } else if let Some(content) = line.strip_prefix('+') {
                lines.push(DiffLine::Add {
                    new_line: u32::try_from(new_line).ok()?,
                    content,
                });
                new_line += 1;
            } else if !line.starts_with('\\') {
                old_line += 1;
                new_line += 1;
            }
        }

        Some(lines)
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.content)
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>()).parse(input)
}

/// `start[,len]`, len defaults to 1
fn line_range(input: &str) -> IResult<&str, LineRange> {
    (number, opt(preceded(char(','), number)))
        .map(|(start, len)| LineRange {
            start,
            len: len.unwrap_or(1),
        })
        .parse(input)
}

fn header_ranges(input: &str) -> IResult<&str, (LineRange, LineRange)> {
    all_consuming(separated_pair(
        preceded(char('-'), line_range),
        char(' '),
        preceded(char('+'), line_range),
    ))
    .parse(input)
}
