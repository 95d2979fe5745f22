use serde::Deserialize;

pub const FIELD_SEPARATOR: char = '%';
pub const TRANSFORM_SEPARATOR: char = '|';
pub const UNKNOWN_TITLE: &str = "untitled";

const FORBIDDEN_CHARS: [char; 7] = ['*', '"', ':', '/', '\\', '?', '|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    Lower,
    Upper,
    Capitalize,
    Title,
    SwapCase,
}

impl CaseTransform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            "capitalize" => Some(Self::Capitalize),
            "title" => Some(Self::Title),
            "swapcase" => Some(Self::SwapCase),
            _ => None,
        }
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Capitalize => {
                let mut chars = input.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.as_str().to_lowercase().chars())
                        .collect(),
                    None => String::new(),
                }
            }
            Self::Title => {
                let mut output = String::with_capacity(input.len());
                let mut word_start = true;
                for c in input.chars() {
                    if c.is_alphabetic() {
                        if word_start {
                            output.extend(c.to_uppercase());
                        } else {
                            output.extend(c.to_lowercase());
                        }
                        word_start = false;
                    } else {
                        output.push(c);
                        word_start = true;
                    }
                }
                output
            }
            Self::SwapCase => input
                .chars()
                .flat_map(|c| {
                    if c.is_uppercase() {
                        c.to_lowercase().collect::<Vec<_>>()
                    } else {
                        c.to_uppercase().collect::<Vec<_>>()
                    }
                })
                .collect(),
        }
    }
}

/// Metadata a naming scheme can refer to.
#[derive(Debug, Clone, Copy)]
pub struct NameFields<'a> {
    pub albumartist: &'a str,
    pub album: &'a str,
    pub artist: &'a str,
    pub title: &'a str,
    pub tracknumber: u32,
}

/// A file naming template such as `%tracknumber% - %title%|lower`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct NamingScheme {
    template: String,
    transform: Option<CaseTransform>,
}

impl NamingScheme {
    pub fn parse(scheme: &str) -> Self {
        match scheme.rsplit_once(TRANSFORM_SEPARATOR) {
            Some((template, transform)) => Self {
                template: template.to_string(),
                transform: CaseTransform::from_name(transform),
            },
            None => Self {
                template: scheme.to_string(),
                transform: None,
            },
        }
    }

    /// Renders the scheme without extension; the result is already safe as a file name.
    pub fn render(&self, fields: &NameFields) -> String {
        let tracknumber = format!("{:02}", fields.tracknumber);
        let name: String = self
            .template
            .split(FIELD_SEPARATOR)
            .map(|piece| match piece {
                "albumartist" => fields.albumartist,
                "album" => fields.album,
                "artist" => fields.artist,
                "title" => fields.title,
                "tracknumber" => tracknumber.as_str(),
                literal => literal,
            })
            .collect();

        let name = match self.transform {
            Some(transform) => transform.apply(&name),
            None => name,
        };
        sanitize_file_name(&name)
    }
}

impl From<String> for NamingScheme {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>() -> NameFields<'a> {
        NameFields {
            albumartist: "Various Artists",
            album: "Best Of: Vol. 1",
            artist: "The Band",
            title: "Don't Stop / Go",
            tracknumber: 3,
        }
    }

    #[test]
    fn renders_fields_and_lowercases() {
        let scheme = NamingScheme::parse("%tracknumber% - %title%|lower");
        assert_eq!(scheme.render(&fields()), "03 - don't stop _ go");
    }

    #[test]
    fn album_scheme_replaces_forbidden_characters() {
        let scheme = NamingScheme::parse("%albumartist% - %album%");
        assert_eq!(scheme.render(&fields()), "Various Artists - Best Of_ Vol. 1");
    }

    #[test]
    fn unknown_transform_keeps_case() {
        let scheme = NamingScheme::parse("%artist%|shout");
        assert_eq!(scheme.render(&fields()), "The Band");
    }

    #[test]
    fn literal_percent_pieces_pass_through() {
        let scheme = NamingScheme::parse("disc %tracknumber%");
        assert_eq!(scheme.render(&fields()), "disc 03");
    }

    #[test]
    fn case_transforms() {
        assert_eq!(CaseTransform::Upper.apply("abc Def"), "ABC DEF");
        assert_eq!(CaseTransform::Capitalize.apply("hELLO wORLD"), "Hello world");
        assert_eq!(CaseTransform::Title.apply("hELLO wORLD-x"), "Hello World-X");
        assert_eq!(CaseTransform::SwapCase.apply("Hello World"), "hELLO wORLD");
        assert_eq!(CaseTransform::Capitalize.apply(""), "");
    }
}
