use super::*;

const CATALOG: &str = r#"
    <input class='search-input' placeholder='Search products...'>
    <a class='category-pill active' data-category='all' href='#'>All</a>
    <a class='category-pill' data-category='clothing' href='#'>Clothing</a>
    <a class='category-pill' data-category='accessories' href='#'>Accessories</a>
    <div id='shirt' class='product-card' data-category='clothing'>
      <h5 class='card-title'>Red Cotton Shirt</h5>
      <p class='card-text'>Soft breathable cotton.</p>
    </div>
    <div id='sweater' class='product-card' data-category='clothing'>
      <h5 class='card-title'>Wool Sweater</h5>
      <p class='card-text'>Warm winter wear.</p>
    </div>
    <div id='belt' class='product-card' data-category='accessories'>
      <h5 class='card-title'>Leather Belt</h5>
      <p class='card-text'>Red-brown leather.</p>
    </div>
"#;

#[test]
fn typing_filters_by_title_and_description() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.type_text(".search-input", "cotton")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_hidden("#belt")?;

    // "red" hits the shirt title and the belt description.
    page.type_text(".search-input", "red")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_visible("#belt")?;
    Ok(())
}

#[test]
fn clearing_the_query_restores_every_product() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.type_text(".search-input", "no such product")?;
    page.assert_hidden("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_hidden("#belt")?;

    page.type_text(".search-input", "")?;
    page.assert_visible("#shirt")?;
    page.assert_visible("#sweater")?;
    page.assert_visible("#belt")?;
    Ok(())
}

#[test]
fn search_is_case_insensitive() -> Result<()> {
    let mut page = Page::open(CATALOG)?;
    page.type_text(".search-input", "WOOL")?;
    page.assert_hidden("#shirt")?;
    page.assert_visible("#sweater")?;
    Ok(())
}

#[test]
fn category_pill_narrows_and_tracks_active_state() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.click(".category-pill[data-category='clothing']")?;
    page.assert_visible("#shirt")?;
    page.assert_visible("#sweater")?;
    page.assert_hidden("#belt")?;
    assert_eq!(page.active_category(), Some("clothing"));

    page.assert_has_class(".category-pill[data-category='clothing']", "active")?;
    page.assert_lacks_class(".category-pill[data-category='all']", "active")?;
    page.assert_count(".category-pill.active", 1)?;

    page.click(".category-pill[data-category='accessories']")?;
    page.assert_hidden("#shirt")?;
    page.assert_visible("#belt")?;
    page.assert_count(".category-pill.active", 1)?;
    Ok(())
}

#[test]
fn pill_clicks_never_navigate() -> Result<()> {
    let mut page = Page::open(CATALOG)?;
    page.click(".category-pill[data-category='clothing']")?;
    assert!(page.navigations().is_empty());
    assert!(page.scroll_requests().is_empty());
    Ok(())
}

#[test]
fn search_and_category_compose_as_a_conjunction() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.type_text(".search-input", "red")?;
    page.click(".category-pill[data-category='clothing']")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_hidden("#belt")?;

    page.click(".category-pill[data-category='accessories']")?;
    page.assert_hidden("#shirt")?;
    page.assert_visible("#belt")?;

    // Widening one filter keeps the other applied.
    page.click(".category-pill[data-category='all']")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_visible("#belt")?;

    page.type_text(".search-input", "")?;
    page.assert_visible("#sweater")?;
    Ok(())
}

#[test]
fn category_survives_retyping_and_search_survives_repilling() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.click(".category-pill[data-category='clothing']")?;
    page.type_text(".search-input", "wool")?;
    page.assert_hidden("#shirt")?;
    page.assert_visible("#sweater")?;

    page.type_text(".search-input", "cotton")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_hidden("#belt")?;
    Ok(())
}

#[test]
fn pill_without_category_attribute_shows_everything() -> Result<()> {
    let mut page = Page::open(
        r#"
        <a class='category-pill' href='#'>Everything</a>
        <div id='a' class='product-card' data-category='x'></div>
        <div id='b' class='product-card'></div>
        "#,
    )?;

    page.click(".category-pill")?;
    assert_eq!(page.active_category(), Some("all"));
    page.assert_visible("#a")?;
    page.assert_visible("#b")?;
    Ok(())
}

#[test]
fn uncategorized_product_hides_under_a_specific_category() -> Result<()> {
    let mut page = Page::open(
        r#"
        <a class='category-pill' data-category='shoes' href='#'>Shoes</a>
        <div id='bare' class='product-card'>
          <h5 class='card-title'>Mystery Box</h5>
        </div>
        "#,
    )?;

    page.click(".category-pill")?;
    page.assert_hidden("#bare")?;
    Ok(())
}

#[test]
fn product_missing_title_or_text_matches_only_the_empty_query() -> Result<()> {
    let mut page = Page::open(
        r#"
        <input class='search-input'>
        <div id='bare' class='product-card'></div>
        "#,
    )?;

    page.type_text(".search-input", "x")?;
    page.assert_hidden("#bare")?;
    page.type_text(".search-input", "")?;
    page.assert_visible("#bare")?;
    Ok(())
}

#[test]
fn search_filter_works_in_isolation() -> Result<()> {
    let mut page = Page::from_html(
        r#"
        <input class='search-input'>
        <div id='p' class='product-card'>
          <h5 class='card-title'>Hat</h5>
          <p class='card-text'>Felt.</p>
        </div>
        "#,
    )?;
    page.install_search_filter()?;

    page.type_text(".search-input", "glove")?;
    page.assert_hidden("#p")?;
    assert_eq!(page.search_term(), "glove");
    Ok(())
}

#[test]
fn generic_dispatch_drives_listeners_directly() -> Result<()> {
    let mut page = Page::open(CATALOG)?;

    page.dispatch(".category-pill[data-category='clothing']", "click")?;
    assert_eq!(page.active_category(), Some("clothing"));
    page.assert_hidden("#belt")?;
    page.assert_count(".category-pill.active", 1)?;

    // Event types nothing listens for fall through silently.
    page.dispatch("#shirt", "change")?;
    page.assert_visible("#shirt")?;
    Ok(())
}

#[test]
fn typed_text_is_observable_on_the_input() -> Result<()> {
    let mut page = Page::open(CATALOG)?;
    page.type_text(".search-input", "wool")?;
    page.assert_value(".search-input", "wool")?;

    let err = page
        .assert_value(".search-input", "cotton")
        .expect_err("value should not match");
    assert!(matches!(err, Error::AssertionFailed { .. }));
    Ok(())
}

#[test]
fn page_without_search_input_still_opens() -> Result<()> {
    let page = Page::open("<div class='product-card'><h5 class='card-title'>x</h5></div>")?;
    page.assert_visible(".product-card")?;
    Ok(())
}

#[test]
fn decomposed_accents_in_markup_match_composed_queries() -> Result<()> {
    let mut page = Page::open(
        "<input class='search-input'>\
         <div id='blend' class='product-card'>\
           <h5 class='card-title'>Cafe\u{301} Blend</h5>\
         </div>",
    )?;

    page.type_text(".search-input", "caf\u{e9}")?;
    page.assert_visible("#blend")?;
    Ok(())
}
