use super::*;

mod search_and_category_filters;
mod selector_engine_and_dom_tree;
