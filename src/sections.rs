// src/sections.rs
//! Section delimiter protocol shared by the prompt builder and the delivery splitter.
//!
//! The generator is told to open every section with `---SECTION: <TAG>---`.
//! The splitter tokenizes on [`SECTION_MARKER`] and matches the tag exactly;
//! anything it does not recognize lands in [`SectionTag::Misc`].

/// Literal token the splitter keys on.
pub const SECTION_MARKER: &str = "---SECTION: ";
/// Closes the tag on the marker line.
pub const SECTION_CLOSE: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionTag {
    General,
    Tech,
    /// Catch-all for untagged text and unknown tags. Never offered to the generator.
    Misc,
}

impl SectionTag {
    /// Tags the generator may use, in the order sections should appear.
    pub const ADVERTISED: [SectionTag; 2] = [SectionTag::General, SectionTag::Tech];

    pub fn as_tag(self) -> &'static str {
        match self {
            SectionTag::General => "GENERAL",
            SectionTag::Tech => "TECH",
            SectionTag::Misc => "misc",
        }
    }

    /// Exact match only: `general` or ` GENERAL` are not recognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ADVERTISED.into_iter().find(|t| t.as_tag() == tag)
    }

    /// Full delimiter line, e.g. `---SECTION: TECH---`.
    pub fn delimiter(self) -> String {
        format!("{SECTION_MARKER}{}{SECTION_CLOSE}", self.as_tag())
    }

    pub fn header(self) -> &'static str {
        match self {
            SectionTag::General => "📰 **General News Briefing**",
            SectionTag::Tech => "🤖 **AI & Tech Briefing**",
            SectionTag::Misc => "📌 **News Briefing**",
        }
    }

    /// Human description used in the prompt.
    pub fn title(self) -> &'static str {
        match self {
            SectionTag::General => "general, domestic and world news",
            SectionTag::Tech => "AI, IT and technology news",
            SectionTag::Misc => "other news",
        }
    }
}

/// One named slice of the generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingSection {
    pub tag: SectionTag,
    /// Tag text as written by the generator (`misc` when there was none).
    pub name: String,
    pub body: String,
}

/// Split generated text into sections on [`SECTION_MARKER`].
///
/// Text before the first marker becomes a `Misc` section. Whitespace-only parts
/// are dropped.
pub fn split_sections(text: &str) -> Vec<BriefingSection> {
    let mut out = Vec::new();
    for (idx, part) in text.split(SECTION_MARKER).enumerate() {
        if part.trim().is_empty() {
            continue;
        }
        let section = if idx == 0 {
            // preamble, no marker in front of it
            BriefingSection {
                tag: SectionTag::Misc,
                name: SectionTag::Misc.as_tag().to_string(),
                body: part.trim().to_string(),
            }
        } else {
            parse_tagged_part(part)
        };
        if section.body.is_empty() {
            continue;
        }
        out.push(section);
    }
    out
}

fn parse_tagged_part(part: &str) -> BriefingSection {
    let (first_line, rest) = match part.split_once('\n') {
        Some((line, rest)) => (line, rest),
        None => (part, ""),
    };

    match first_line.split_once(SECTION_CLOSE) {
        Some((raw_tag, trailing)) => {
            let raw_tag = raw_tag.trim();
            let tag = SectionTag::from_tag(raw_tag).unwrap_or(SectionTag::Misc);
            let trailing = trailing.trim_start_matches('-').trim();
            let body = if trailing.is_empty() {
                rest.trim().to_string()
            } else {
                format!("{trailing}\n{rest}").trim().to_string()
            };
            BriefingSection {
                tag,
                name: if raw_tag.is_empty() {
                    SectionTag::Misc.as_tag().to_string()
                } else {
                    raw_tag.to_string()
                },
                body,
            }
        }
        // marker without a closing `---`: keep the text, route it to misc
        None => BriefingSection {
            tag: SectionTag::Misc,
            name: SectionTag::Misc.as_tag().to_string(),
            body: part.trim().to_string(),
        },
    }
}
