use super::*;

#[test]
fn descendant_and_child_combinators_scope_matches() -> Result<()> {
    let page = Page::from_html(
        r#"
        <div class='outer'>
          <section><p class='hit'>one</p></section>
          <p class='hit'>two</p>
        </div>
        <p class='hit'>three</p>
        "#,
    )?;

    assert_eq!(page.dom.query_selector_all(".outer .hit")?.len(), 2);
    assert_eq!(page.dom.query_selector_all(".outer > .hit")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("p.hit")?.len(), 3);
    Ok(())
}

#[test]
fn sibling_combinators_walk_element_siblings_only() -> Result<()> {
    let page = Page::from_html(
        r#"
        <h2>Title</h2>
        text between
        <p id='first'>a</p>
        <p id='second'>b</p>
        <p id='third'>c</p>
        "#,
    )?;

    let next = page.dom.query_selector_all("h2 + p")?;
    assert_eq!(next.len(), 1);
    assert_eq!(page.dom.attr(next[0], "id").as_deref(), Some("first"));

    assert_eq!(page.dom.query_selector_all("h2 ~ p")?.len(), 3);
    assert_eq!(page.dom.query_selector_all("#first ~ p")?.len(), 2);
    Ok(())
}

#[test]
fn attribute_operators_match_expected_elements() -> Result<()> {
    let page = Page::from_html(
        r#"
        <a href='#top'>top</a>
        <a href='/shop#deals'>deals</a>
        <div data-category='shoes-outdoor' lang='en-US' title='summer sale'></div>
        <div class='pill active' data-confirm='Delete?'></div>
        "#,
    )?;

    assert_eq!(page.dom.query_selector_all("a[href^=\"#\"]")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("[href$='deals']")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("[title*='sale']")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("[class~='active']")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("[lang|='en']")?.len(), 1);
    assert_eq!(page.dom.query_selector_all("[data-confirm]")?.len(), 1);
    assert_eq!(
        page.dom
            .query_selector_all("[data-category='shoes-outdoor']")?
            .len(),
        1
    );
    assert_eq!(page.dom.query_selector_all("[data-category='shoes']")?.len(), 0);
    Ok(())
}

#[test]
fn selector_groups_union_without_duplicates() -> Result<()> {
    let page = Page::from_html(
        r#"
        <div class='card alert'></div>
        <div class='alert'></div>
        <table class='table'></table>
        "#,
    )?;

    // The element carrying both classes is reported once.
    assert_eq!(
        page.dom.query_selector_all(".card, .alert, .table")?.len(),
        3
    );
    Ok(())
}

#[test]
fn pseudo_class_selectors_are_rejected() -> Result<()> {
    let page = Page::from_html("<ul><li>a</li></ul>")?;
    let err = page
        .dom
        .query_selector_all("li:first-child")
        .expect_err("pseudo-classes should be rejected");
    assert!(matches!(err, Error::UnsupportedSelector(_)));
    Ok(())
}

#[test]
fn tag_matching_is_case_insensitive() -> Result<()> {
    let page = Page::from_html("<DIV class='box'><SPAN>x</SPAN></DIV>")?;
    assert_eq!(page.dom.query_selector_all("div span")?.len(), 1);
    Ok(())
}

#[test]
fn detach_removes_subtree_from_queries_and_id_lookup() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <div id='wrap'><span id='inner' class='tag'>x</span></div>
        <span class='tag'>y</span>
        "#,
    )?;

    assert!(page.dom.by_id("inner").is_some());
    let wrap = page.select_one("#wrap")?;
    page.dom.detach(wrap);

    assert!(page.dom.by_id("inner").is_none());
    assert_eq!(page.dom.query_selector_all(".tag")?.len(), 1);
    Ok(())
}

#[test]
fn character_references_decode_in_text_and_attributes() -> Result<()> {
    let page = Page::from_html(
        r#"<p id='msg' title='a &amp; b'>1&nbsp;500 &lt;lek&gt; &#65;&#x42;</p>"#,
    )?;

    let msg = page.select_one("#msg")?;
    assert_eq!(page.dom.text_content(msg), "1\u{a0}500 <lek> AB");
    assert_eq!(page.dom.attr(msg, "title").as_deref(), Some("a & b"));
    Ok(())
}

#[test]
fn void_tags_do_not_swallow_following_content() -> Result<()> {
    let page = Page::from_html("<div id='box'>a<br>b<img src='x.png'>c</div>")?;
    let boxed = page.select_one("#box")?;
    assert_eq!(page.dom.text_content(boxed), "abc");
    assert_eq!(page.dom.query_selector_all("#box br")?.len(), 1);
    Ok(())
}

#[test]
fn script_content_stays_raw_text() -> Result<()> {
    let page = Page::from_html(
        "<div id='a'>x</div><script>if (1 < 2) { document.write('<b>no</b>'); }</script>",
    )?;
    assert_eq!(page.dom.query_selector_all("script b")?.len(), 0);
    assert_eq!(page.dom.query_selector_all("script")?.len(), 1);
    Ok(())
}

#[test]
fn implicit_li_close_keeps_items_siblings() -> Result<()> {
    let page = Page::from_html("<ul><li>one<li>two<li>three</ul>")?;
    assert_eq!(page.dom.query_selector_all("ul > li")?.len(), 3);
    assert_eq!(page.dom.query_selector_all("li li")?.len(), 0);
    Ok(())
}

#[test]
fn form_controls_initialize_from_markup() -> Result<()> {
    let page = Page::from_html(
        r#"
        <form>
          <input id='name' value='Arta' required>
          <input id='locked' disabled>
          <textarea id='note'>hello</textarea>
        </form>
        "#,
    )?;

    let name = page.select_one("#name")?;
    assert_eq!(page.dom.value(name).as_deref(), Some("Arta"));
    assert!(page.dom.element(name).is_some_and(|e| e.required));

    let locked = page.select_one("#locked")?;
    assert!(page.dom.disabled(locked));

    let note = page.select_one("#note")?;
    assert_eq!(page.dom.value(note).as_deref(), Some("hello"));
    Ok(())
}

#[test]
fn display_none_hides_element_and_descendants() -> Result<()> {
    let mut page = Page::from_html(
        "<div id='outer'><span id='inner'>x</span></div><span id='free'>y</span>",
    )?;

    page.assert_visible("#inner")?;
    let outer = page.select_one("#outer")?;
    page.dom.set_display(outer, Some("none"))?;

    page.assert_hidden("#outer")?;
    page.assert_hidden("#inner")?;
    page.assert_visible("#free")?;

    page.dom.set_display(outer, None)?;
    page.assert_visible("#inner")?;
    Ok(())
}

#[test]
fn class_list_operations_preserve_other_tokens() -> Result<()> {
    let mut page = Page::from_html("<div id='t' class='a  b'></div>")?;
    let t = page.select_one("#t")?;

    page.dom.class_add(t, "c")?;
    assert_eq!(page.dom.attr(t, "class").as_deref(), Some("a b c"));

    page.dom.class_add(t, "b")?;
    assert_eq!(page.dom.attr(t, "class").as_deref(), Some("a b c"));

    page.dom.class_remove(t, "a")?;
    assert_eq!(page.dom.attr(t, "class").as_deref(), Some("b c"));

    assert!(!page.dom.class_toggle(t, "b")?);
    assert!(page.dom.class_toggle(t, "b")?);
    assert!(page.dom.class_contains(t, "b")?);
    Ok(())
}

#[test]
fn class_operations_on_text_nodes_fail() -> Result<()> {
    let mut page = Page::from_html("<p id='p'>text</p>")?;
    let p = page.select_one("#p")?;
    let text = page.dom.nodes[p.0].children[0];
    let err = page
        .dom
        .class_add(text, "x")
        .expect_err("text node has no class list");
    assert!(matches!(err, Error::PageRuntime(_)));
    Ok(())
}
