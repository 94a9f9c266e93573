//! Section splitter — groups source lines into comment/code pairs.
//!
//! Line-by-line walk with two accumulators. A new section starts only when a
//! comment line follows code; consecutive comments merge into one block and
//! code never splits code.

use crate::language::LanguageSpec;
use crate::model::Section;

/// Split `source` into ordered sections for `lang`.
///
/// Always returns at least one section, even for empty input.
pub fn split(lang: &LanguageSpec, source: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut docs = String::new();
    let mut code = String::new();

    for (n, line) in lines(source).enumerate() {
        if n == 0 && line.starts_with("#!") {
            continue;
        }

        if lang.is_comment(line) {
            if !code.is_empty() {
                sections.push(Section::new(
                    sections.len(),
                    std::mem::take(&mut docs),
                    std::mem::take(&mut code),
                ));
            }
            docs.push_str(lang.strip_comment(line));
            docs.push('\n');
        } else {
            code.push_str(line);
            code.push('\n');
        }
    }

    sections.push(Section::new(sections.len(), docs, code));
    sections
}

/// Lines split on `\n`, without the phantom empty line after a final newline.
fn lines(source: &str) -> impl Iterator<Item = &str> {
    source.strip_suffix('\n').unwrap_or(source).split('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn php() -> LanguageSpec {
        LanguageSpec::new("php", "php", "//", &[])
    }

    fn pairs(sections: &[Section]) -> Vec<(&str, &str)> {
        sections
            .iter()
            .map(|s| (s.docs_text.as_str(), s.code_text.as_str()))
            .collect()
    }

    #[test]
    fn title_intro_and_step() {
        let src = "// Title\n// intro\nx = 1\n// step two\ny = 2\n";
        let sections = split(&php(), src);
        assert_eq!(
            pairs(&sections),
            vec![("Title\nintro\n", "x = 1\n"), ("step two\n", "y = 2\n")]
        );
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[1].index, 1);
    }

    #[test]
    fn code_only_is_one_section() {
        let sections = split(&php(), "a();\n\nb();\n");
        assert_eq!(pairs(&sections), vec![("", "a();\n\nb();\n")]);
    }

    #[test]
    fn comments_only_is_one_section_with_empty_code() {
        let sections = split(&php(), "// one\n// two\n");
        assert_eq!(pairs(&sections), vec![("one\ntwo\n", "")]);
    }

    #[test]
    fn empty_input_still_yields_a_section() {
        let sections = split(&php(), "");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].docs_text, "");
        assert_eq!(sections[0].code_text, "\n");
    }

    #[test]
    fn leading_code_becomes_undocumented_first_section() {
        let sections = split(&php(), "<?php\n// Docs\nf();\n");
        assert_eq!(pairs(&sections), vec![("", "<?php\n"), ("Docs\n", "f();\n")]);
    }

    #[test]
    fn shebang_is_dropped() {
        let sections = split(&php(), "#!/usr/bin/x\n// Doc\ncode();\n");
        assert_eq!(pairs(&sections), vec![("Doc\n", "code();\n")]);
        for s in &sections {
            assert!(!s.docs_text.contains("#!"));
            assert!(!s.code_text.contains("#!"));
        }
    }

    #[test]
    fn shebang_only_matters_on_first_line() {
        let sections = split(&php(), "a();\n#!not-a-shebang\n");
        assert_eq!(sections[0].code_text, "a();\n#!not-a-shebang\n");
    }

    #[test]
    fn blank_lines_inside_code_are_preserved() {
        let src = "// A\none();\n\n\ntwo();\n// B\nthree();\n";
        let sections = split(&php(), src);
        assert_eq!(sections[0].code_text, "one();\n\n\ntwo();\n");
    }

    #[test]
    fn indented_comments_are_docs() {
        let sections = split(&php(), "f() {\n    // inner\n    g();\n}\n");
        assert_eq!(
            pairs(&sections),
            vec![("", "f() {\n"), ("inner\n", "    g();\n}\n")]
        );
    }

    #[test]
    fn section_count_follows_comment_transitions() {
        // comment→code transitions with prior code: after "b" and after "d"
        let src = "// 1\na\nb\n// 2\n// 3\nc\nd\n// 4\ne\n";
        let sections = split(&php(), src);
        assert_eq!(sections.len(), 3);
        for (i, s) in sections.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn hash_marker_languages() {
        let py = LanguageSpec::new("py", "python", "#", &[]);
        let sections = split(&py, "#!/usr/bin/env python\n# Hello\nprint(1)\n");
        assert_eq!(pairs(&sections), vec![("Hello\n", "print(1)\n")]);
    }

    #[test]
    fn missing_final_newline_matches_terminated_input() {
        let a = split(&php(), "// d\nx();");
        let b = split(&php(), "// d\nx();\n");
        assert_eq!(a, b);
    }
}
