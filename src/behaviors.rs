use super::*;

use unicode_normalization::UnicodeNormalization;

/// What a registered listener does when its event fires. Handlers carry no
/// captured state; everything they need is read from the page at event time,
/// so late markup edits are observed the way a live page would observe them.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BehaviorAction {
    ConfirmAction,
    BumpCartCount,
    UpdateSearchTerm,
    ActivateCategoryPill,
    MarkMessageRead,
    ValidateRequiredFields,
    ToggleNavCollapse,
    SmoothScrollAnchor,
}

/// Whether a product listing stays visible under the current filters.
///
/// Both filters must pass: the search query (empty matches everything,
/// otherwise a case-folded substring match against title or description) and
/// the active category (`None` or `"all"` matches everything, otherwise the
/// product's category must equal it exactly). Text is NFC-normalized before
/// lowercasing so composed and decomposed accents compare equal.
pub fn product_visible(
    search_term: &str,
    active_category: Option<&str>,
    title: &str,
    description: &str,
    category: Option<&str>,
) -> bool {
    let query = fold_for_search(search_term);
    let text_match = query.is_empty()
        || fold_for_search(title).contains(&query)
        || fold_for_search(description).contains(&query);

    let category_match = match active_category {
        None => true,
        Some(active) if active == "all" => true,
        Some(active) => category == Some(active),
    };

    text_match && category_match
}

fn fold_for_search(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

impl Page {
    /// Installs every page behavior once, in document-script order.
    pub fn install_all(&mut self) -> Result<()> {
        self.install_fade_in()?;
        self.install_delete_confirm()?;
        self.install_alert_autohide()?;
        self.install_cart_counter()?;
        self.install_search_filter()?;
        self.install_message_read()?;
        self.format_prices()?;
        self.install_form_validation()?;
        self.install_category_filter()?;
        self.install_nav_toggle()?;
        self.install_smooth_scroll()?;
        Ok(())
    }

    /// Tags cards, alerts, and tables with the entrance-animation class.
    pub fn install_fade_in(&mut self) -> Result<()> {
        if !self.installed.insert("fade_in") {
            return Ok(());
        }
        for element in self.dom.query_selector_all(".card, .alert, .table")? {
            self.dom.class_add(element, "fade-in")?;
        }
        Ok(())
    }

    /// Clicking an element with `data-confirm` shows a blocking prompt; a
    /// declined prompt cancels the click's default action.
    pub fn install_delete_confirm(&mut self) -> Result<()> {
        if !self.installed.insert("delete_confirm") {
            return Ok(());
        }
        for element in self.dom.query_selector_all("[data-confirm]")? {
            self.attach_listener(element, "click", BehaviorAction::ConfirmAction);
        }
        Ok(())
    }

    /// Every alert present at install time fades out after 5 seconds and is
    /// removed from the tree 500ms later.
    pub fn install_alert_autohide(&mut self) -> Result<()> {
        if !self.installed.insert("alert_autohide") {
            return Ok(());
        }
        for alert in self.dom.query_selector_all(".alert")? {
            self.schedule_task(5000, TimerAction::FadeOutAlert(alert));
        }
        Ok(())
    }

    /// Add-to-cart buttons bump the cart counter and bounce it for 1 second.
    pub fn install_cart_counter(&mut self) -> Result<()> {
        if !self.installed.insert("cart_counter") {
            return Ok(());
        }
        for button in self.dom.query_selector_all(".add-to-cart")? {
            self.attach_listener(button, "click", BehaviorAction::BumpCartCount);
        }
        Ok(())
    }

    /// Live product search over the search input's `input` events.
    pub fn install_search_filter(&mut self) -> Result<()> {
        if !self.installed.insert("search_filter") {
            return Ok(());
        }
        if let Some(input) = self.dom.query_selector(".search-input")? {
            self.attach_listener(input, "input", BehaviorAction::UpdateSearchTerm);
        }
        Ok(())
    }

    /// Category pills filter products and keep exactly one pill active.
    pub fn install_category_filter(&mut self) -> Result<()> {
        if !self.installed.insert("category_filter") {
            return Ok(());
        }
        for pill in self.dom.query_selector_all(".category-pill")? {
            self.attach_listener(pill, "click", BehaviorAction::ActivateCategoryPill);
        }
        Ok(())
    }

    /// Unread message cards mark themselves read on first click, through the
    /// mark-read service seam.
    pub fn install_message_read(&mut self) -> Result<()> {
        if !self.installed.insert("message_read") {
            return Ok(());
        }
        for card in self.dom.query_selector_all(".message-card")? {
            if self.dom.class_contains(card, "unread")? {
                self.attach_listener(card, "click", BehaviorAction::MarkMessageRead);
            }
        }
        Ok(())
    }

    /// Rewrites every price element to the fixed lek rendering.
    ///
    /// The raw amount is kept in `data-amount` (written back on the first
    /// pass), so running this again re-reads the number instead of trying to
    /// parse its own formatted output.
    pub fn format_prices(&mut self) -> Result<()> {
        for price in self.dom.query_selector_all(".price")? {
            let source = match self.dom.attr(price, "data-amount") {
                Some(raw) => raw,
                None => self.dom.text_content(price),
            };
            let value = parse_price(&source);
            self.dom.set_attr(price, "data-amount", &format_float(value))?;
            self.dom.set_text_content(price, &format_lek(value))?;
        }
        Ok(())
    }

    /// Form submission is blocked while any required field is blank.
    pub fn install_form_validation(&mut self) -> Result<()> {
        if !self.installed.insert("form_validation") {
            return Ok(());
        }
        for form in self.dom.query_selector_all("form")? {
            self.attach_listener(form, "submit", BehaviorAction::ValidateRequiredFields);
        }
        Ok(())
    }

    /// The navbar toggler shows and hides the collapsible menu.
    pub fn install_nav_toggle(&mut self) -> Result<()> {
        if !self.installed.insert("nav_toggle") {
            return Ok(());
        }
        if let Some(toggler) = self.dom.query_selector(".navbar-toggler")? {
            self.attach_listener(toggler, "click", BehaviorAction::ToggleNavCollapse);
        }
        Ok(())
    }

    /// Fragment anchors request a smooth scroll instead of navigating.
    pub fn install_smooth_scroll(&mut self) -> Result<()> {
        if !self.installed.insert("smooth_scroll") {
            return Ok(());
        }
        for anchor in self.dom.query_selector_all("a[href^=\"#\"]")? {
            self.attach_listener(anchor, "click", BehaviorAction::SmoothScrollAnchor);
        }
        Ok(())
    }

    pub(crate) fn run_action(
        &mut self,
        action: BehaviorAction,
        event: &mut EventState,
    ) -> Result<()> {
        match action {
            BehaviorAction::ConfirmAction => self.run_confirm_action(event),
            BehaviorAction::BumpCartCount => self.run_bump_cart_count(),
            BehaviorAction::UpdateSearchTerm => self.run_update_search_term(event),
            BehaviorAction::ActivateCategoryPill => self.run_activate_category_pill(event),
            BehaviorAction::MarkMessageRead => self.run_mark_message_read(event),
            BehaviorAction::ValidateRequiredFields => self.run_validate_required_fields(event),
            BehaviorAction::ToggleNavCollapse => self.run_toggle_nav_collapse(),
            BehaviorAction::SmoothScrollAnchor => self.run_smooth_scroll_anchor(event),
        }
    }

    fn run_confirm_action(&mut self, event: &mut EventState) -> Result<()> {
        let prompt = self
            .dom
            .attr(event.target, "data-confirm")
            .unwrap_or_default();
        self.confirm_prompts.push(prompt);
        let accepted = self
            .confirm_responses
            .pop_front()
            .unwrap_or(self.default_confirm_response);
        if !accepted {
            event.prevent_default();
        }
        Ok(())
    }

    fn run_bump_cart_count(&mut self) -> Result<()> {
        let Some(counter) = self.dom.query_selector(".cart-count")? else {
            return Ok(());
        };
        let bumped = parse_count(&self.dom.text_content(counter)).saturating_add(1);
        self.dom.set_text_content(counter, &bumped.to_string())?;
        self.dom.class_add(counter, "bounce")?;
        self.schedule_task(1000, TimerAction::SettleCartBounce(counter));
        Ok(())
    }

    fn run_update_search_term(&mut self, event: &mut EventState) -> Result<()> {
        self.search_term = self.dom.value(event.target).unwrap_or_default();
        self.apply_product_filters()
    }

    fn run_activate_category_pill(&mut self, event: &mut EventState) -> Result<()> {
        event.prevent_default();

        let category = self
            .dom
            .attr(event.target, "data-category")
            .unwrap_or_else(|| "all".to_string());
        self.active_category = Some(category);

        for pill in self.dom.query_selector_all(".category-pill")? {
            self.dom.class_remove(pill, "active")?;
        }
        self.dom.class_add(event.target, "active")?;

        self.apply_product_filters()
    }

    /// Applies the composed search and category filters to every product
    /// card. Title, description, and category are read from the live tree.
    pub(crate) fn apply_product_filters(&mut self) -> Result<()> {
        for product in self.dom.query_selector_all(".product-card")? {
            let title = match self.dom.query_selector_from(product, ".card-title")? {
                Some(node) => self.dom.text_content(node),
                None => String::new(),
            };
            let description = match self.dom.query_selector_from(product, ".card-text")? {
                Some(node) => self.dom.text_content(node),
                None => String::new(),
            };
            let category = self.dom.attr(product, "data-category");

            let visible = product_visible(
                &self.search_term,
                self.active_category.as_deref(),
                &title,
                &description,
                category.as_deref(),
            );
            self.dom
                .set_display(product, if visible { None } else { Some("none") })?;
        }
        Ok(())
    }

    fn run_mark_message_read(&mut self, event: &mut EventState) -> Result<()> {
        // Read status latches: once the unread marker is gone the handler
        // does nothing, even though the listener stays registered.
        if !self.dom.class_contains(event.target, "unread")? {
            return Ok(());
        }

        let key = self
            .dom
            .attr(event.target, "data-message-id")
            .or_else(|| self.dom.attr(event.target, "id"))
            .unwrap_or_default();
        self.mark_read_calls.push(key);

        let ok = self
            .mark_read_responses
            .pop_front()
            .unwrap_or(self.default_mark_read_response);
        if ok {
            self.dom.class_remove(event.target, "unread")?;
        }
        Ok(())
    }

    fn run_validate_required_fields(&mut self, event: &mut EventState) -> Result<()> {
        let mut valid = true;
        for field in self.dom.query_selector_all_from(event.target, "[required]")? {
            let blank = self
                .dom
                .value(field)
                .unwrap_or_default()
                .trim()
                .is_empty();
            if blank {
                valid = false;
                self.dom.class_add(field, "is-invalid")?;
            } else {
                self.dom.class_remove(field, "is-invalid")?;
            }
        }
        if !valid {
            event.prevent_default();
        }
        Ok(())
    }

    fn run_toggle_nav_collapse(&mut self) -> Result<()> {
        if let Some(collapse) = self.dom.query_selector(".navbar-collapse")? {
            self.dom.class_toggle(collapse, "show")?;
        }
        Ok(())
    }

    fn run_smooth_scroll_anchor(&mut self, event: &mut EventState) -> Result<()> {
        event.prevent_default();

        let href = self.dom.attr(event.target, "href").unwrap_or_default();
        let Some(fragment) = href.strip_prefix('#') else {
            return Ok(());
        };
        if fragment.is_empty() {
            return Ok(());
        }
        if self.dom.by_id(fragment).is_some() {
            self.scroll_requests.push(ScrollRequest {
                target_id: fragment.to_string(),
                behavior: "smooth".to_string(),
                block: "start".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn empty_query_matches_any_product() {
        assert!(product_visible("", None, "Cotton Shirt", "Soft fabric", None));
        assert!(product_visible("", Some("all"), "", "", Some("clothing")));
    }

    #[test]
    fn query_matches_title_or_description_case_insensitively() {
        assert!(product_visible("COTTON", None, "Cotton Shirt", "", None));
        assert!(product_visible("soft", None, "Cotton Shirt", "Soft fabric", None));
        assert!(!product_visible("wool", None, "Cotton Shirt", "Soft fabric", None));
    }

    #[test]
    fn category_must_match_exactly_unless_all() {
        assert!(product_visible("", Some("shoes"), "Boot", "", Some("shoes")));
        assert!(!product_visible("", Some("shoes"), "Boot", "", Some("hats")));
        assert!(!product_visible("", Some("shoes"), "Boot", "", None));
        assert!(product_visible("", Some("all"), "Boot", "", None));
    }

    #[test]
    fn filters_compose_as_conjunction() {
        assert!(product_visible("boot", Some("shoes"), "Boot", "", Some("shoes")));
        assert!(!product_visible("boot", Some("hats"), "Boot", "", Some("shoes")));
        assert!(!product_visible("scarf", Some("shoes"), "Boot", "", Some("shoes")));
    }

    #[test]
    fn accent_forms_compare_equal_after_normalization() {
        // "é" precomposed vs "e" + combining acute.
        assert!(product_visible("caf\u{e9}", None, "Cafe\u{301} Blend", "", None));
    }
}
