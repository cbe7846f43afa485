use crate::error::LoadError;
use std::fs;
use std::path::Path;

/// Whether the input starts with a program count line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Count,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Count from the first line. Informational only.
    pub declared_programs: Option<usize>,
    pub body: String,
}

impl SourceFile {
    pub fn parse(text: &str, header: Header) -> Result<Self, LoadError> {
        match header {
            Header::None => Ok(Self {
                declared_programs: None,
                body: text.to_string(),
            }),
            Header::Count => {
                let (first, body) = text.split_once('\n').unwrap_or((text, ""));
                let line = first.trim();
                let count = line.parse::<usize>().map_err(|_| LoadError::InvalidHeader {
                    line: line.to_string(),
                })?;
                Ok(Self {
                    declared_programs: Some(count),
                    body: body.to_string(),
                })
            }
        }
    }

    pub fn read(path: &Path, header: Header) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_count_line_from_body() {
        let file = SourceFile::parse("2\nstart print a end\nstart end\n", Header::Count).unwrap();
        assert_eq!(file.declared_programs, Some(2));
        assert_eq!(file.body, "start print a end\nstart end\n");
    }

    #[test]
    fn count_line_tolerates_carriage_return() {
        let file = SourceFile::parse("1\r\nstart end", Header::Count).unwrap();
        assert_eq!(file.declared_programs, Some(1));
        assert_eq!(file.body, "start end");
    }

    #[test]
    fn rejects_non_numeric_count() {
        let error = SourceFile::parse("start print a end", Header::Count).unwrap_err();
        assert!(matches!(error, LoadError::InvalidHeader { ref line } if line == "start print a end"));
    }

    #[test]
    fn headerless_input_is_all_body() {
        let file = SourceFile::parse("start end", Header::None).unwrap();
        assert_eq!(file.declared_programs, None);
        assert_eq!(file.body, "start end");
    }
}
