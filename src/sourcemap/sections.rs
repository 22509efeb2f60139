//! Sectioned map construction for combined outputs.

use super::{Offset, RegularMap, Section, SectionedMap, VERSION};

/// Number of lines `content` occupies, counting a trailing empty line.
///
/// This is the newline count plus one, i.e. the lines a unit takes up once
/// another unit is appended after a joining `\n`.
#[inline]
pub fn line_count(content: &str) -> u32 {
    u32::try_from(content.split('\n').count()).unwrap_or(u32::MAX)
}

/// Build a sectioned map for units joined with `\n`, in order.
///
/// Section `i` starts at the sum of [`line_count`] over units `0..i`;
/// columns are always zero because every unit starts on a fresh line.
pub fn sectioned<'a, I>(units: I) -> SectionedMap
where
    I: IntoIterator<Item = (&'a str, &'a RegularMap)>,
{
    let mut line = 0u32;
    let sections = units
        .into_iter()
        .map(|(content, map)| {
            let section = Section {
                offset: Offset { line, column: 0 },
                map: map.clone(),
            };
            line = line.saturating_add(line_count(content));
            section
        })
        .collect();

    SectionedMap {
        version: VERSION,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(source: &str) -> RegularMap {
        RegularMap::empty(source, None)
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\n"), 2);
    }

    #[test]
    fn test_offsets_accumulate() {
        let (a, b, c) = (map("a"), map("b"), map("c"));
        let combined = sectioned([
            ("x;\ny;", &a),
            ("z;", &b),
            ("w;", &c),
        ]);

        let offsets: Vec<_> = combined.sections.iter().map(|s| s.offset).collect();
        assert_eq!(
            offsets,
            vec![
                Offset { line: 0, column: 0 },
                Offset { line: 2, column: 0 },
                Offset { line: 3, column: 0 },
            ]
        );
        assert_eq!(combined.sections[1].map.sources, vec!["b"]);
    }

    #[test]
    fn test_offsets_match_joined_output() {
        let (a, b) = (map("a"), map("b"));
        let contents = ["line1\nline2\n", "second"];
        let combined = sectioned([(contents[0], &a), (contents[1], &b)]);

        let joined = contents.join("\n");
        let start = joined.lines().position(|l| l == "second").unwrap();
        assert_eq!(combined.sections[1].offset.line as usize, start);
    }
}
