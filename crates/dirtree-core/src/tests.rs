#[cfg(test)]
mod unit_tests {
    use super::super::*;
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;

    const PROJECT_TREE: &str = "/ — project root
├── /src — source folder
│   ├── main.rs
│   └── lib.rs
└── README.md";

    /// Drop every tag and decode the three entities the renderer produces.
    fn strip_markup(html: &str) -> String {
        let mut text = String::new();
        let mut in_tag = false;
        for c in html.chars() {
            match c {
                '<' => in_tag = true,
                '>' if in_tag => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    fn dirtree_processors() -> HashMap<String, Box<dyn CodeBlockProcessor>> {
        let mut processors: HashMap<String, Box<dyn CodeBlockProcessor>> = HashMap::new();
        processors.insert(
            BLOCK_LANGUAGE.to_string(),
            Box::new(DirtreeProcessor::new(
                Box::new(PreformattedGenerator),
                GeneratorOptions::default(),
            )),
        );
        processors
    }

    struct Failing;

    impl CodeBlockProcessor for Failing {
        fn process(&self, _source: &str) -> Result<String> {
            Err(anyhow!("malformed source"))
        }
    }

    #[test]
    fn test_render_project_tree() {
        insta::assert_snapshot!(render_block(PROJECT_TREE), @r#"
        <span class="dirtree-dir">/</span><span class="dirtree-annotation"> — project root</span>
        <span class="dirtree-connector">├──</span><span class="dirtree-dir"> /src</span><span class="dirtree-annotation"> — source folder</span>
        <span class="dirtree-connector">│   ├──</span><span class="dirtree-file"> main.rs</span>
        <span class="dirtree-connector">│   └──</span><span class="dirtree-file"> lib.rs</span>
        <span class="dirtree-connector">└──</span><span class="dirtree-file"> README.md</span>
        "#);
    }

    #[test]
    fn test_round_trip_text_identity() {
        let lines = [
            "├── /src — source folder",
            "│　　└── <b>&amp;</b>.txt — a <note> & more",
            "+-- /bin",
            "|   `-- odd ascii",
            "plain text without glyphs",
            "├── crlf.txt\r",
            "",
            "│   ",
            "   /spaced — x — y",
        ];
        for line in lines {
            let rendered = render_line(line);
            assert_eq!(strip_markup(&rendered), line, "line: {:?}", line);
        }
    }

    #[test]
    fn test_escaping_in_every_segment() {
        let rendered = render_line("└── <a&b> — x > y");
        assert_eq!(
            rendered,
            r#"<span class="dirtree-connector">└──</span><span class="dirtree-file"> &lt;a&amp;b&gt;</span><span class="dirtree-annotation"> — x &gt; y</span>"#
        );
        assert_eq!(
            render_line("a &amp; b"),
            r#"<span class="dirtree-file">a &amp;amp; b</span>"#
        );
    }

    #[test]
    fn test_classification_across_indent_styles() {
        assert!(render_line("├── /dir").contains(r#"class="dirtree-dir""#));
        assert!(render_line("├──　/dir").contains(r#"class="dirtree-dir""#));
        assert!(render_line("/dir").contains(r#"class="dirtree-dir""#));
        assert!(render_line("├── file").contains(r#"class="dirtree-file""#));
        assert!(render_line("├──file/").contains(r#"class="dirtree-file""#));
    }

    #[test]
    fn test_plain_text_line_is_a_file_span() {
        assert_eq!(
            render_line("just <text>"),
            r#"<span class="dirtree-file">just &lt;text&gt;</span>"#
        );
    }

    #[test]
    fn test_block_preserves_blank_lines() {
        let block = "/ — root1\n\n/ — root2";
        let rendered = render_block(block);
        assert_eq!(rendered.split('\n').collect::<Vec<_>>()[1], "");
        assert_eq!(strip_markup(&rendered), block);
    }

    #[test]
    fn test_document_with_dirtree_block() {
        let md = "# Layout\n\n```dirtree\n/ — root\n└── a&b.txt\n```\n";
        let html = render_document(md, &dirtree_processors()).unwrap();
        assert!(html.contains("<h1>Layout</h1>"));
        assert!(html.contains(
            r#"<div class="el-pre"><pre class="language-dirtree"><code class="language-dirtree is-loaded">"#
        ));
        assert!(html.contains(r#"<span class="dirtree-file"> a&amp;b.txt</span></code>"#));
        assert!(!html.contains(r#"<pre><code class="language-dirtree">"#));
    }

    #[test]
    fn test_document_processor_error_propagates() {
        let mut processors: HashMap<String, Box<dyn CodeBlockProcessor>> = HashMap::new();
        processors.insert(BLOCK_LANGUAGE.to_string(), Box::new(Failing));
        let err = render_document("```dirtree\nx\n```\n", &processors).unwrap_err();
        assert!(format!("{:#}", err).contains("malformed source"));
    }

    #[test]
    fn test_document_without_blocks_matches_plain_render() {
        let md = "Some *text*.";
        assert_eq!(render_document(md, &dirtree_processors()).unwrap(), to_html(md));
    }

    #[test]
    fn test_sanitize_keeps_dirtree_classes() {
        let html = render_document("```dirtree\n├── /src\n```\n", &dirtree_processors()).unwrap();
        let sanitized = sanitize::sanitize_dirtree_html(&html);
        assert!(sanitized.contains("dirtree-connector"));
        assert!(sanitized.contains("dirtree-dir"));
        assert!(sanitized.contains("el-pre"));
    }

    #[test]
    fn test_sanitize_html_removes_scripts() {
        let html = r#"<p>Hello</p><script>alert('XSS')</script><span class="dirtree-dir">x</span>"#;
        let sanitized = sanitize::sanitize_html(html);
        assert!(!sanitized.contains("<script"));
        assert!(!sanitized.contains("dirtree-dir"));
        assert!(sanitized.contains("Hello"));
    }
}
