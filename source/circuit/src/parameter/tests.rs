// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ParamValue, Parameter};
use expect_test::expect;

#[test]
fn clones_share_the_cell() {
    let theta = Parameter::new("theta", 0.25);
    let alias = theta.clone();
    theta.set(0.75).expect("unbounded set should succeed");
    assert_eq!(0.75, alias.value());
    assert_eq!(1, alias.epoch());
}

#[test]
fn bounds_reject_out_of_range_values_at_set_time() {
    let r = Parameter::bounded("reflectivity", 0.5, 0.0, 1.0).expect("initial value in bounds");
    let err = r.set(1.5).expect_err("out-of-range set should fail");
    expect!["parameter value must be within [0, 1], got 1.5"].assert_eq(&err.to_string());
    // The value is rejected, not clamped.
    assert_eq!(0.5, r.value());
    assert_eq!(0, r.epoch());
}

#[test]
fn bounded_rejects_bad_initial_value() {
    assert!(Parameter::bounded("phi", 2.0, 0.0, 1.0).is_err());
}

#[test]
fn epoch_counts_successful_sets_only() {
    let p = Parameter::bounded("p", 0.2, 0.0, 1.0).expect("initial value in bounds");
    p.set(0.3).expect("in-range set should succeed");
    let _ = p.set(7.0);
    p.set(0.4).expect("in-range set should succeed");
    assert_eq!(2, p.epoch());
}

#[test]
fn param_value_resolves_through_references() {
    let p = Parameter::new("phi", 1.0);
    let fixed = ParamValue::from(0.5);
    let linked = ParamValue::from(&p);
    assert_eq!(0.5, fixed.resolve());
    assert_eq!(1.0, linked.resolve());
    p.set(2.0).expect("unbounded set should succeed");
    assert_eq!(2.0, linked.resolve());
    assert_eq!(0, fixed.epoch());
    assert_eq!(1, linked.epoch());
}
