use storefront_page::{Page, ScrollRequest};

const STOREFRONT_HTML: &str = r##"
<nav class="navbar">
  <a class="navbar-brand" href="/">Dyqani</a>
  <button class="navbar-toggler">menu</button>
  <div class="navbar-collapse">
    <a href="/shop">Shop</a>
    <a href="#products">Products</a>
    <span class="cart-count">2</span>
  </div>
</nav>

<div class="alert">Order placed successfully.</div>

<div class="container">
  <input class="search-input" placeholder="Search products...">
  <a class="category-pill active" data-category="all" href="#">All</a>
  <a class="category-pill" data-category="clothing" href="#">Clothing</a>
  <a class="category-pill" data-category="accessories" href="#">Accessories</a>

  <section id="products">
    <div id="shirt" class="product-card card" data-category="clothing">
      <h5 class="card-title">Red Cotton Shirt</h5>
      <p class="card-text">Soft breathable cotton.</p>
      <span class="price">1500</span>
      <button class="add-to-cart">Add to cart</button>
    </div>
    <div id="sweater" class="product-card card" data-category="clothing">
      <h5 class="card-title">Wool Sweater</h5>
      <p class="card-text">Warm winter wear.</p>
      <span class="price">12500.75</span>
      <button class="add-to-cart">Add to cart</button>
    </div>
    <div id="belt" class="product-card card" data-category="accessories">
      <h5 class="card-title">Leather Belt</h5>
      <p class="card-text">Red-brown leather.</p>
      <span class="price">990</span>
      <button class="add-to-cart">Add to cart</button>
    </div>
  </section>

  <section id="inbox">
    <div class="message-card unread" data-message-id="m-1">Welcome!</div>
    <div class="message-card" data-message-id="m-0">Old news.</div>
  </section>

  <form id="contact" action="/contact">
    <input id="contact-name" required>
    <textarea id="contact-body" required></textarea>
    <button type="submit">Send</button>
  </form>

  <a id="delete-account" href="/account/delete" data-confirm="Delete your account?">
    Delete account
  </a>
</div>
"##;

#[test]
fn page_opens_with_prices_formatted_and_entrance_classes() -> storefront_page::Result<()> {
    let page = Page::open(STOREFRONT_HTML)?;

    page.assert_text("#shirt .price", "1500\u{a0}Lek\u{eb}")?;
    page.assert_text("#sweater .price", "12\u{a0}501\u{a0}Lek\u{eb}")?;
    page.assert_text("#belt .price", "990\u{a0}Lek\u{eb}")?;

    page.assert_has_class(".alert", "fade-in")?;
    page.assert_has_class("#shirt", "fade-in")?;
    page.assert_count(".product-card", 3)?;
    Ok(())
}

#[test]
fn shopping_session_exercises_filters_cart_and_alert_together() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;

    page.type_text(".search-input", "red")?;
    page.click(".category-pill[data-category='clothing']")?;
    page.assert_visible("#shirt")?;
    page.assert_hidden("#sweater")?;
    page.assert_hidden("#belt")?;

    page.click("#shirt .add-to-cart")?;
    page.assert_text(".cart-count", "3")?;
    page.assert_has_class(".cart-count", "bounce")?;

    // The bounce settles at 1s; the alert is still on screen until 5s.
    page.advance_time(1000)?;
    page.assert_lacks_class(".cart-count", "bounce")?;
    page.assert_exists(".alert")?;

    page.advance_time(4000)?;
    page.assert_exists(".alert")?;
    page.advance_time(500)?;
    page.assert_count(".alert", 0)?;

    // Hidden products can still be added through direct clicks elsewhere,
    // and widening the category brings the belt back while "red" holds.
    page.click(".category-pill[data-category='all']")?;
    page.assert_visible("#belt")?;
    page.assert_hidden("#sweater")?;
    Ok(())
}

#[test]
fn inbox_messages_latch_read_through_the_service() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;

    page.click(".message-card.unread")?;
    page.assert_count(".message-card.unread", 0)?;
    assert_eq!(page.mark_read_calls(), ["m-1"]);

    page.click("[data-message-id='m-0']")?;
    assert_eq!(page.mark_read_calls(), ["m-1"]);
    Ok(())
}

#[test]
fn contact_form_blocks_until_required_fields_are_filled() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;

    page.click("#contact button")?;
    assert!(page.form_submissions().is_empty());
    page.assert_has_class("#contact-name", "is-invalid")?;

    page.type_text("#contact-name", "Arta")?;
    page.type_text("#contact-body", "Përshëndetje!")?;
    page.click("#contact button")?;
    assert_eq!(page.form_submissions(), ["/contact"]);
    page.assert_lacks_class("#contact-name", "is-invalid")?;
    Ok(())
}

#[test]
fn destructive_link_waits_for_the_confirm_dialog() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;

    page.click("#delete-account")?;
    assert!(page.navigations().is_empty());
    assert_eq!(page.confirm_prompts(), ["Delete your account?"]);

    page.push_confirm_response(true);
    page.click("#delete-account")?;
    assert_eq!(page.navigations(), ["/account/delete"]);
    Ok(())
}

#[test]
fn nav_links_split_between_navigation_and_smooth_scroll() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;

    page.click(".navbar-toggler")?;
    page.assert_has_class(".navbar-collapse", "show")?;

    page.click(".navbar-collapse a[href^='#']")?;
    assert_eq!(
        page.scroll_requests(),
        [ScrollRequest {
            target_id: "products".to_string(),
            behavior: "smooth".to_string(),
            block: "start".to_string(),
        }]
    );
    assert!(page.navigations().is_empty());

    page.click(".navbar-collapse a[href='/shop']")?;
    assert_eq!(page.navigations(), ["/shop"]);
    Ok(())
}

#[test]
fn reopening_markup_after_mutation_starts_clean() -> storefront_page::Result<()> {
    let mut page = Page::open(STOREFRONT_HTML)?;
    page.click("#shirt .add-to-cart")?;
    page.flush()?;

    let fresh = Page::open(STOREFRONT_HTML)?;
    fresh.assert_text(".cart-count", "2")?;
    assert_eq!(fresh.now_ms(), 0);
    assert!(fresh.mark_read_calls().is_empty());
    page.assert_text(".cart-count", "3")?;
    Ok(())
}
