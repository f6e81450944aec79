use super::*;

#[test]
fn decrease_never_goes_below_one() {
    let mut quantity = Quantity::MIN;
    for _ in 0..3 {
        quantity = quantity.decrease();
    }
    assert_eq!(quantity.get(), 1);
    assert_eq!(Quantity::new(7).decrease().get(), 6);
}

#[test]
fn increase_has_no_practical_upper_bound() {
    assert_eq!(Quantity::new(41).increase().get(), 42);
    assert_eq!(Quantity::new(5_000_000_000).increase().get(), 5_000_000_001);
    assert_eq!(Quantity::new(5_000_000_000).decrease().get(), 4_999_999_999);
    assert_eq!(
        Quantity::new(i64::MAX).increase().get(),
        i64::MAX.unsigned_abs() + 1
    );
    let ceiling = Quantity::try_from(u64::MAX).expect("quantity");
    assert_eq!(ceiling.increase().get(), u64::MAX);
}

#[test]
fn new_clamps_below_one() {
    assert_eq!(Quantity::new(0), Quantity::MIN);
    assert_eq!(Quantity::new(-12), Quantity::MIN);
}

#[test]
fn reads_integer_prefix_like_a_form_field() {
    assert_eq!(parse_int_prefix("  12"), Some(12));
    assert_eq!(parse_int_prefix("3abc"), Some(3));
    assert_eq!(parse_int_prefix("-4"), Some(-4));
    assert_eq!(parse_int_prefix("+5"), Some(5));
    assert_eq!(parse_int_prefix("abc"), None);
    assert_eq!(parse_int_prefix(""), None);
    assert_eq!(parse_int_prefix("-"), None);
    assert_eq!(Quantity::read_or_min("nope"), Quantity::MIN);
    assert_eq!(Quantity::read("0").map(Quantity::get), Some(1));
}

#[test]
fn quantity_rejects_zero_when_deserialized() {
    assert!(serde_json::from_str::<Quantity>("0").is_err());
    let quantity: Quantity = serde_json::from_str("3").expect("quantity");
    assert_eq!(quantity.get(), 3);
    assert_eq!(serde_json::to_string(&quantity).expect("json"), "3");
}

#[test]
fn order_status_round_trips_through_form_values() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
    ] {
        assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
    }
    assert!("shipped".parse::<OrderStatus>().is_err());
}

#[test]
fn product_id_parses_trimmed_text() {
    assert_eq!(" 17 ".parse::<ProductId>().expect("id"), ProductId(17));
    assert!("x".parse::<ProductId>().is_err());
}
