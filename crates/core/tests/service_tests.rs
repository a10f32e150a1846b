// ═══════════════════════════════════════════════════════════════════
// Service Tests — PricingService, CheckoutService, ViewController,
// ViewService
// ═══════════════════════════════════════════════════════════════════

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use storefront_core::errors::CoreError;
use storefront_core::models::basket::Basket;
use storefront_core::models::catalog::{default_menu, CatalogCache, CatalogItem};
use storefront_core::models::user::{AuthState, AuthUser};
use storefront_core::models::view::{
    QuantityBadge, View, EMPTY_BASKET_MESSAGE, EMPTY_CATALOG_MESSAGE,
};
use storefront_core::services::checkout_service::CheckoutService;
use storefront_core::services::pricing_service::PricingService;
use storefront_core::services::view_service::{ViewController, ViewService};

fn item(id: &str, price: Decimal) -> CatalogItem {
    CatalogItem::new(id, format!("Item {id}"), price, "desc", "Brewed", "☕")
}

fn single_item_catalog() -> CatalogCache {
    CatalogCache::from_items(vec![item("1", dec!(5.50))])
}

fn basket_of(entries: &[(&str, i64)]) -> Basket {
    let mut basket = Basket::new();
    for (id, delta) in entries {
        basket.adjust(id, *delta).unwrap();
    }
    basket
}

// ═══════════════════════════════════════════════════════════════════
// PricingService
// ═══════════════════════════════════════════════════════════════════

mod pricing {
    use super::*;

    #[test]
    fn two_coffees() {
        let pricing = PricingService::default();
        let totals = pricing.compute_totals(&basket_of(&[("1", 2)]), &single_item_catalog());

        assert_eq!(totals.subtotal, dec!(11.00));
        assert_eq!(totals.tax, dec!(0.88));
        assert_eq!(totals.total, dec!(11.88));
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.lines.len(), 1);
        assert_eq!(totals.lines[0].line_total, dec!(11.00));
    }

    #[test]
    fn empty_basket_is_zero() {
        let pricing = PricingService::default();
        let totals = pricing.compute_totals(&Basket::new(), &single_item_catalog());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
        assert!(!totals.has_lines());
    }

    #[test]
    fn stale_id_is_excluded_everywhere() {
        let pricing = PricingService::default();
        let catalog = single_item_catalog();
        let with_stale = pricing.compute_totals(&basket_of(&[("1", 2), ("9", 4)]), &catalog);
        let without = pricing.compute_totals(&basket_of(&[("1", 2)]), &catalog);

        assert_eq!(with_stale.subtotal, without.subtotal);
        assert_eq!(with_stale.total, without.total);
        assert_eq!(with_stale.item_count, 2);
        assert_eq!(with_stale.lines.len(), 1);
        assert_eq!(with_stale.excluded, vec!["9".to_string()]);
        assert!(without.excluded.is_empty());
    }

    #[test]
    fn only_stale_ids_price_to_nothing() {
        let pricing = PricingService::default();
        let totals = pricing.compute_totals(&basket_of(&[("9", 1)]), &single_item_catalog());
        assert!(!totals.has_lines());
        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn lines_follow_basket_insertion_order() {
        let pricing = PricingService::default();
        let catalog = CatalogCache::from_items(default_menu());
        let totals = pricing.compute_totals(&basket_of(&[("5", 1), ("1", 1), ("3", 2)]), &catalog);
        let ids: Vec<&str> = totals.lines.iter().map(|l| l.item.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "1", "3"]);
    }

    #[test]
    fn many_lines_accumulate_unrounded() {
        // 3 × 0.333 = 0.999 per line; rounding each line first would give 1.00 × 3.
        let catalog = CatalogCache::from_items(vec![
            item("a", dec!(0.333)),
            item("b", dec!(0.333)),
            item("c", dec!(0.333)),
        ]);
        let pricing = PricingService::new(dec!(0));
        let totals = pricing.compute_totals(&basket_of(&[("a", 3), ("b", 3), ("c", 3)]), &catalog);
        assert_eq!(totals.subtotal, dec!(2.997));
        assert_eq!(totals.total, dec!(2.997));
    }

    #[test]
    fn custom_tax_rate() {
        let pricing = PricingService::new(dec!(0.20));
        let totals = pricing.compute_totals(&basket_of(&[("1", 1)]), &single_item_catalog());
        assert_eq!(totals.tax, dec!(1.10));
        assert_eq!(totals.total, dec!(6.60));
        assert_eq!(pricing.tax_rate(), dec!(0.20));
    }

    #[test]
    fn pure_and_non_mutating() {
        let pricing = PricingService::default();
        let catalog = CatalogCache::from_items(default_menu());
        let basket = basket_of(&[("2", 1), ("9", 2), ("6", 3)]);
        let (basket_before, catalog_before) = (basket.clone(), catalog.clone());

        let first = pricing.compute_totals(&basket, &catalog);
        let second = pricing.compute_totals(&basket, &catalog);

        assert_eq!(first, second);
        assert_eq!(basket, basket_before);
        assert_eq!(catalog, catalog_before);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CheckoutService
// ═══════════════════════════════════════════════════════════════════

mod checkout {
    use super::*;

    #[test]
    fn places_order_and_clears_basket() {
        let pricing = PricingService::default();
        let catalog = single_item_catalog();
        let mut basket = basket_of(&[("1", 2)]);
        let expected = pricing.compute_totals(&basket, &catalog);

        let summary = CheckoutService::new()
            .place_order(&mut basket, &catalog, &pricing)
            .unwrap();

        assert_eq!(summary.total, expected.total);
        assert_eq!(summary.total, dec!(11.88));
        assert_eq!(summary.subtotal, dec!(11.00));
        assert_eq!(summary.tax, dec!(0.88));
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.lines, expected.lines);
        assert!(basket.is_empty());
    }

    #[test]
    fn added_then_removed_is_empty_basket() {
        let pricing = PricingService::default();
        let catalog = single_item_catalog();
        let mut basket = basket_of(&[("1", 1), ("1", -1)]);

        let totals = pricing.compute_totals(&basket, &catalog);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);

        let result = CheckoutService::new().place_order(&mut basket, &catalog, &pricing);
        assert!(matches!(result, Err(CoreError::EmptyBasket)));
    }

    #[test]
    fn stale_only_basket_is_empty_and_untouched() {
        let pricing = PricingService::default();
        let catalog = single_item_catalog();
        let mut basket = basket_of(&[("9", 2)]);

        let result = CheckoutService::default().place_order(&mut basket, &catalog, &pricing);

        assert!(matches!(result, Err(CoreError::EmptyBasket)));
        assert_eq!(basket.quantity("9"), 2);
    }

    #[test]
    fn stale_lines_are_dropped_from_summary() {
        let pricing = PricingService::default();
        let catalog = single_item_catalog();
        let mut basket = basket_of(&[("9", 2), ("1", 1)]);

        let summary = CheckoutService::new()
            .place_order(&mut basket, &catalog, &pricing)
            .unwrap();

        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.total, dec!(5.94));
        assert!(basket.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// ViewController
// ═══════════════════════════════════════════════════════════════════

mod view_controller {
    use super::*;

    fn signed_in() -> AuthState {
        AuthState::SignedIn(AuthUser::new("uid-1", "a@b.c"))
    }

    #[test]
    fn starts_loading() {
        assert_eq!(ViewController::new().current(), View::Loading);
    }

    #[test]
    fn auth_events_drive_loading() {
        let mut views = ViewController::new();
        let t = views.on_auth_state(&AuthState::SignedOut);
        assert_eq!((t.from, t.to), (View::Loading, View::Login));

        let mut views = ViewController::new();
        let t = views.on_auth_state(&signed_in());
        assert_eq!((t.from, t.to), (View::Loading, View::Menu));
        assert!(t.enters_menu());
    }

    #[test]
    fn login_and_register_toggle() {
        let mut views = ViewController::new();
        views.on_auth_state(&AuthState::SignedOut);

        let t = views.navigate(View::Register).unwrap();
        assert_eq!((t.from, t.to), (View::Login, View::Register));
        let t = views.navigate(View::Login).unwrap();
        assert_eq!((t.from, t.to), (View::Register, View::Login));
    }

    #[test]
    fn same_view_navigation_is_noop() {
        let mut views = ViewController::new();
        views.on_auth_state(&AuthState::SignedOut);
        assert!(views.navigate(View::Login).unwrap().is_noop());
    }

    #[test]
    fn navigation_cannot_reach_menu() {
        let mut views = ViewController::new();
        views.on_auth_state(&AuthState::SignedOut);
        let err = views.navigate(View::Menu).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(views.current(), View::Login);
    }

    #[test]
    fn only_sign_out_leaves_menu() {
        let mut views = ViewController::new();
        views.on_auth_state(&signed_in());

        for target in [View::Login, View::Register, View::Loading] {
            assert!(views.navigate(target).is_err(), "navigate to {target}");
            assert_eq!(views.current(), View::Menu);
        }

        let t = views.on_auth_state(&AuthState::SignedOut);
        assert!(t.leaves_menu());
        assert_eq!(views.current(), View::Login);
    }

    #[test]
    fn invalid_transition_message() {
        let mut views = ViewController::new();
        let err = views.navigate(View::Register).unwrap_err();
        assert_eq!(err.to_string(), "Cannot switch view from loading to register");
    }
}

// ═══════════════════════════════════════════════════════════════════
// ViewService
// ═══════════════════════════════════════════════════════════════════

mod view_service {
    use super::*;

    #[test]
    fn catalog_view_groups_and_badges() {
        let catalog = CatalogCache::from_items(default_menu());
        let basket = basket_of(&[("4", 2)]);
        let view = ViewService::default().catalog_view(&catalog, &basket);

        let categories: Vec<&str> = view.sections.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["Brewed", "Specialty", "Pastry", "Food"]);
        assert!(view.empty_message.is_none());

        let donut = &view.sections[2].rows[0];
        assert_eq!(donut.id, "4");
        assert_eq!(donut.price, "$3.50");
        assert_eq!(donut.quantity, 2);
        assert!(donut.can_decrement);

        let cookie = &view.sections[2].rows[1];
        assert_eq!(cookie.quantity, 0);
        assert!(!cookie.can_decrement);
    }

    #[test]
    fn empty_catalog_view_has_message() {
        let view = ViewService::default().catalog_view(&CatalogCache::new(), &Basket::new());
        assert!(view.sections.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_CATALOG_MESSAGE));
    }

    #[test]
    fn badges_cover_every_catalog_row() {
        let catalog = CatalogCache::from_items(vec![item("1", dec!(5.50)), item("2", dec!(6))]);
        let basket = basket_of(&[("2", 3), ("9", 1)]);

        let badges = ViewService::default().badges(&catalog, &basket);

        assert_eq!(
            badges,
            vec![QuantityBadge::new("1", 0), QuantityBadge::new("2", 3)]
        );
        assert!(!badges[0].can_decrement);
        assert!(badges[1].can_decrement);
    }

    #[test]
    fn basket_view_formats_lines_and_totals() {
        let pricing = PricingService::default();
        let totals = pricing.compute_totals(&basket_of(&[("1", 2)]), &single_item_catalog());
        let view = ViewService::new("$").basket_view(&totals);

        assert_eq!(view.subtotal, "$11.00");
        assert_eq!(view.tax, "$0.88");
        assert_eq!(view.total, "$11.88");
        assert!(view.checkout_enabled);
        assert!(view.empty_message.is_none());
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].unit_label, "2 x $5.50");
        assert_eq!(view.lines[0].line_total, "$11.00");
    }

    #[test]
    fn empty_basket_view_is_disabled() {
        let totals = PricingService::default().compute_totals(&Basket::new(), &single_item_catalog());
        let view = ViewService::default().basket_view(&totals);

        assert!(view.lines.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.total, "$0.00");
        assert!(!view.checkout_enabled);
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_BASKET_MESSAGE));
    }

    #[test]
    fn currency_symbol_is_configurable() {
        let service = ViewService::new("€");
        assert_eq!(service.currency_symbol(), "€");
        let view = service.catalog_view(&single_item_catalog(), &Basket::new());
        assert_eq!(view.sections[0].rows[0].price, "€5.50");
    }
}
