mod common;

use pandemia::align::align;
use pandemia::domain::Dataset;

use common::{code, registry, series};

#[test]
fn axis_is_intersection_of_dates() {
    let registry = registry(&["AAA", "BBB"]);
    let mut dataset = Dataset::new();
    dataset.insert(
        code("AAA"),
        series(&[("2021-01-01", 1.0), ("2021-01-02", 2.0), ("2021-01-03", 3.0)]),
    );
    dataset.insert(
        code("BBB"),
        series(&[("2021-01-02", 20.0), ("2021-01-03", 30.0), ("2021-01-04", 40.0)]),
    );

    let chart = align(&dataset, &registry);
    assert_eq!(chart.x_axis, vec!["2021-01-02", "2021-01-03"]);
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].code, code("AAA"));
    assert_eq!(chart.series[0].values, vec![2.0, 3.0]);
    assert_eq!(chart.series[1].values, vec![20.0, 30.0]);
}

#[test]
fn disjoint_dates_give_empty_axis() {
    let registry = registry(&["AAA", "BBB"]);
    let mut dataset = Dataset::new();
    dataset.insert(code("AAA"), series(&[("2021-01-01", 1.0)]));
    dataset.insert(code("BBB"), series(&[("2021-01-02", 2.0)]));

    let chart = align(&dataset, &registry);
    assert!(chart.x_axis.is_empty());
    assert_eq!(chart.series.len(), 2);
    assert!(chart.series.iter().all(|s| s.values.is_empty()));
}

#[test]
fn display_name_falls_back_to_code() {
    let registry = registry(&[]);
    let mut dataset = Dataset::new();
    dataset.insert(code("ZZZ"), series(&[("2021-01-01", 1.0)]));

    let chart = align(&dataset, &registry);
    assert_eq!(chart.series[0].name, "ZZZ");
}
