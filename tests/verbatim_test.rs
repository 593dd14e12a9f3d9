//! Verbatim elements and the CDATA policies.

use ptx_format::{CdataPolicy, Config, format_pretext_with};

fn plain() -> Config {
    let mut config = Config::standard();
    config.set_include_doc_id(false);
    config
}

#[track_caller]
fn assert_stays_same(config: &Config, expr: &str) {
    assert_eq!(format_pretext_with(expr, config).unwrap(), expr);
}

#[test]
fn test_cdata_created_if_policy_always() {
    let mut config = plain();
    config.set_cdata_policy(CdataPolicy::Always);
    assert_stays_same(&config, "<pre><![CDATA[\n  f(x) > 5 & g(x) < 2\n]]></pre>");
}

#[test]
fn test_cdata_not_created_if_policy_never() {
    let mut config = plain();
    config.set_cdata_policy(CdataPolicy::Never);
    assert_stays_same(&config, "<pre>\n  f(x) &gt; 5 &amp; g(x) &lt; 2\n</pre>");
}

#[test]
fn test_cdata_controlled_via_tag_list() {
    let mut config = plain();
    config.set_cdata_policy(CdataPolicy::Tags(vec!["pre".to_string()]));
    assert_stays_same(
        &config,
        "<section>\n  <pre><![CDATA[\n    f(x) > 5 & g(x) < 2\n  ]]></pre>\n  \
         <input>\n    f(x) &gt; 5 &amp; g(x) &lt; 2\n  </input>\n</section>",
    );
}

#[test]
fn test_cdata_controlled_via_number_of_escapes() {
    let mut config = plain();
    config.set_cdata_policy(CdataPolicy::Threshold(3));
    assert_stays_same(
        &config,
        "<section>\n  <pre><![CDATA[\n    f(x) > 5 & g(x) < 2\n  ]]></pre>\n  \
         <input>\n    f(x) &gt; 5 &amp; g(x) = 2\n  </input>\n</section>",
    );
}

#[test]
fn test_cdata_sections_in_source_are_reformatted_by_policy() {
    // CDATA in the source is just text; the policy decides the output form.
    let mut config = plain();
    config.set_cdata_policy(CdataPolicy::Never);
    let formatted = format_pretext_with("<pre><![CDATA[a < b]]></pre>", &config).unwrap();
    assert_eq!(formatted, "<pre>a &lt; b</pre>");
}

#[test]
fn test_single_line_verbatim_keeps_close_tag_adjacent() {
    assert_stays_same(&plain(), "<section>\n  <pre>x = 1</pre>\n</section>");
}

#[test]
fn test_empty_verbatim_self_closes() {
    assert_stays_same(&plain(), "<section>\n  <pre src=\"http://somewhere.com\" />\n</section>");
}

#[test]
fn test_verbatim_preserves_interior_whitespace_exactly() {
    assert_stays_same(
        &plain(),
        "<program>\n  <input>code here\n\n  must preserve Indenting\n  </input>\n</program>",
    );
}

#[test]
fn test_nested_markup_inside_verbatim_is_kept() {
    assert_stays_same(
        &plain(),
        "<section>\n  <latex-image>\\begin{tikzpicture}<fill color=\"red\" />\\end{tikzpicture}</latex-image>\n</section>",
    );
}
