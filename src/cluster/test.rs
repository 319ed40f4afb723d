use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cluster::{
    ClusterIndex, ClusterIndexBuilder, ClusterOptions, ClusterParams, ClusterResult,
};
use crate::r#type::Point;
use crate::viewport::{region_to_bounding_box, BoundingBox, Region};

fn params(radius: f64) -> ClusterParams {
    ClusterOptions::default()
        .with_radius(radius)
        .resolve(400.)
        .unwrap()
}

fn random_points(n: usize, seed: u64) -> Vec<Point<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| Point::new(rng.gen_range(-170.0..170.0), rng.gen_range(-80.0..80.0), i))
        .collect()
}

/// Collect the payloads of every point reachable from `results`, expanding clusters.
fn reachable_payloads(
    index: &ClusterIndex<usize>,
    results: &[ClusterResult<usize>],
) -> Vec<usize> {
    let mut payloads = vec![];
    for result in results {
        match result {
            ClusterResult::Leaf(leaf) => payloads.push(leaf.payload),
            ClusterResult::Cluster(cluster) => {
                let leaves = index.expand(cluster.id, None);
                assert_eq!(leaves.len(), cluster.point_count as usize);
                payloads.extend(leaves.into_iter().map(|p| p.payload));
            }
        }
    }
    payloads.sort_unstable();
    payloads
}

#[test]
fn empty_index() {
    let index: ClusterIndex<()> = ClusterIndexBuilder::new(params(40.)).finish();
    assert!(index.is_empty());
    assert_eq!(index.num_clusters(), 0);
    for zoom in 0..20 {
        assert!(index.query(&BoundingBox::world(), zoom).is_empty());
    }
}

#[test]
fn single_point_is_a_leaf_at_every_zoom() {
    let index = ClusterIndex::new([Point::new(13.4, 52.5, "berlin")], params(40.));
    for zoom in 0..20 {
        let results = index.query(&BoundingBox::world(), zoom);
        assert_eq!(results.len(), 1);
        match &results[0] {
            ClusterResult::Leaf(leaf) => {
                assert_eq!(leaf.index, 0);
                assert_eq!(leaf.payload, "berlin");
                assert_eq!(leaf.coordinate.longitude, 13.4);
                assert_eq!(leaf.coordinate.latitude, 52.5);
            }
            ClusterResult::Cluster(_) => panic!("single point should never cluster"),
        }
    }
}

#[test]
fn nearby_points_merge_when_zoomed_out() {
    let index = ClusterIndex::new(
        [Point::new(0., 0., 'a'), Point::new(0.01, 0., 'b')],
        params(40.),
    );

    let zoomed_out = index.query(&BoundingBox::world(), 5);
    assert_eq!(zoomed_out.len(), 1);
    let cluster = match &zoomed_out[0] {
        ClusterResult::Cluster(cluster) => *cluster,
        ClusterResult::Leaf(_) => panic!("expected a cluster"),
    };
    assert_eq!(cluster.point_count, 2);
    assert!((cluster.coordinate.longitude - 0.005).abs() < 1e-9);
    assert!(cluster.coordinate.latitude.abs() < 1e-9);

    // the merge radius at zoom 11 still covers 0.01 degrees, at zoom 12 it does not
    assert_eq!(index.expansion_zoom(cluster.id), Some(12));
    assert_eq!(index.query(&BoundingBox::world(), 11).len(), 1);

    let zoomed_in = index.query(&BoundingBox::world(), 16);
    assert_eq!(zoomed_in.len(), 2);
    assert!(zoomed_in.iter().all(|r| !r.is_cluster()));
}

#[test]
fn children_partition_the_cluster() {
    let index = ClusterIndex::new(random_points(2000, 3), params(60.));
    let results = index.query(&BoundingBox::world(), 2);

    let mut checked = 0;
    for cluster in results.iter().filter_map(|r| match r {
        ClusterResult::Cluster(c) => Some(c),
        ClusterResult::Leaf(_) => None,
    }) {
        let children = index.children(cluster.id);
        assert!(children.len() >= 2);
        let total: u32 = children.iter().map(|c| c.num_points()).sum();
        assert_eq!(total, cluster.point_count);

        let expansion = index.expansion_zoom(cluster.id).unwrap();
        assert!(expansion > 2);
        for child in children.iter().filter_map(|c| c.cluster_id()) {
            assert!(index.expansion_zoom(child).unwrap() > expansion);
        }
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn every_point_is_reachable_exactly_once() {
    let points = random_points(1000, 11);
    let index = ClusterIndex::new(points.clone(), params(40.));
    let expected: Vec<usize> = (0..points.len()).collect();

    for zoom in 0..=18 {
        let results = index.query(&BoundingBox::world(), zoom);
        let total: u32 = results.iter().map(|r| r.num_points()).sum();
        assert_eq!(total as usize, points.len(), "zoom {}", zoom);
        assert_eq!(reachable_payloads(&index, &results), expected, "zoom {}", zoom);
    }
}

#[test]
fn query_is_idempotent() {
    let index = ClusterIndex::new(random_points(500, 5), params(40.));
    let bbox = BoundingBox::new(-60., -30., 60., 45.);
    for zoom in [1, 4, 9, 17] {
        assert_eq!(index.query(&bbox, zoom), index.query(&bbox, zoom));
    }
}

#[test]
fn stale_ids_expand_to_nothing() {
    let points = random_points(300, 9);
    let first = ClusterIndex::new(points.clone(), params(60.));
    let second = ClusterIndex::new(points, params(60.));

    let id = first
        .query(&BoundingBox::world(), 1)
        .iter()
        .find_map(|r| r.cluster_id())
        .unwrap();

    assert!(!first.expand(id, None).is_empty());
    assert!(second.expand(id, None).is_empty());
    assert!(second.children(id).is_empty());
    assert_eq!(second.expansion_zoom(id), None);
}

#[test]
fn expand_respects_max_leaves() {
    let index = ClusterIndex::new(random_points(1000, 21), params(80.));
    let cluster = index
        .query(&BoundingBox::world(), 1)
        .into_iter()
        .filter_map(|r| match r {
            ClusterResult::Cluster(c) => Some(c),
            ClusterResult::Leaf(_) => None,
        })
        .max_by_key(|c| c.point_count)
        .unwrap();
    assert!(cluster.point_count > 10);

    let all = index.expand(cluster.id, None);
    let first_ten = index.expand(cluster.id, Some(10));
    assert_eq!(first_ten.len(), 10);
    assert_eq!(first_ten[..], all[..10]);
    assert!(index.expand(cluster.id, Some(0)).is_empty());

    let page = index.leaves(cluster.id, 5, 7);
    assert_eq!(page[..], all[7..12]);

    let past_end = index.leaves(cluster.id, 5, cluster.point_count as usize);
    assert!(past_end.is_empty());
}

#[test]
fn min_points_keeps_small_groups_apart() {
    let points = [Point::new(0., 0., 0), Point::new(0.01, 0., 1)];
    let params = ClusterOptions::default()
        .with_radius(40.)
        .with_min_points(3)
        .resolve(400.)
        .unwrap();
    let index = ClusterIndex::new(points, params);
    let results = index.query(&BoundingBox::world(), 1);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| !r.is_cluster()));
}

#[test]
fn query_filters_by_bounding_box() {
    let index = ClusterIndex::new(
        [
            Point::new(-100., 40., 0),
            Point::new(10., 50., 1),
            Point::new(140., -30., 2),
        ],
        params(40.),
    );
    let results = index.query(&BoundingBox::new(0., 0., 20., 60.), 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].coordinate().longitude, 10.);
}

#[test]
fn query_wraps_across_the_antimeridian() {
    let index = ClusterIndex::new(
        [
            Point::new(179.5, 0., 0),
            Point::new(0., 0., 1),
            Point::new(-179.5, 0., 2),
        ],
        params(40.),
    );

    let payloads = |results: Vec<ClusterResult<i32>>| -> Vec<i32> {
        results
            .into_iter()
            .map(|r| match r {
                ClusterResult::Leaf(leaf) => leaf.payload,
                ClusterResult::Cluster(_) => panic!("expected leaves"),
            })
            .collect()
    };

    // eastern part first, then the western part
    let results = index.query(&BoundingBox::new(170., -10., 190., 10.), 17);
    assert_eq!(payloads(results), vec![0, 2]);

    let results = index.query(&BoundingBox::new(-190., -10., -170., 10.), 17);
    assert_eq!(payloads(results), vec![0, 2]);

    // a negative longitude delta normalizes to a near-world span
    let bbox = region_to_bounding_box(&Region::new(179., 0., -2., 1.));
    assert_eq!(index.query(&bbox, 17).len(), 3);
}

#[test]
fn zero_width_box_on_the_antimeridian() {
    let index = ClusterIndex::new(
        [
            Point::new(0., 0., 0),
            Point::new(-100., 5., 1),
            Point::new(180., 0., 2),
        ],
        params(40.),
    );

    let bbox = region_to_bounding_box(&Region::new(180., 0., 0., 10.));
    assert_eq!(bbox, BoundingBox::new(180., -10., 180., 10.));
    let longitudes: Vec<f64> = index
        .query(&bbox, 17)
        .iter()
        .map(|r| r.coordinate().longitude)
        .collect();
    assert_eq!(longitudes, vec![180.]);

    // starting on the antimeridian and wrapping into the western hemisphere
    let results = index.query(&BoundingBox::new(180., -10., 270., 10.), 17);
    let mut longitudes: Vec<f64> = results.iter().map(|r| r.coordinate().longitude).collect();
    longitudes.sort_by(f64::total_cmp);
    assert_eq!(longitudes, vec![-100., 180.]);
}

#[test]
fn out_of_range_coordinates_are_tolerated() {
    let index = ClusterIndex::new(
        [
            Point::new(190., 10., 0),
            Point::new(-400., 95., 1),
            Point::new(f64::NAN, 0., 2),
            Point::new(5., f64::INFINITY, 3),
        ],
        params(40.),
    );

    for zoom in 0..=18 {
        let results = index.query(&BoundingBox::world(), zoom);
        // points with non-finite coordinates never match
        let total: u32 = results.iter().map(|r| r.num_points()).sum();
        assert_eq!(total, 2);
    }

    assert!(index
        .query(&BoundingBox::new(f64::NAN, 0., 10., 10.), 5)
        .is_empty());
}

#[test]
fn query_clamps_zoom() {
    let index = ClusterIndex::new(random_points(300, 1), params(60.));
    let world = BoundingBox::world();
    assert_eq!(index.query(&world, 0), index.query(&world, 1));
    assert_eq!(index.query(&world, 17), index.query(&world, 40));
    assert_eq!(index.query(&world, 40).len(), 300);
}

#[test]
fn build_is_deterministic_apart_from_ids() {
    let points = random_points(400, 2);
    let a = ClusterIndex::new(points.clone(), params(40.));
    let b = ClusterIndex::new(points, params(40.));
    assert_eq!(a.num_clusters(), b.num_clusters());

    let counts = |index: &ClusterIndex<usize>| -> Vec<(u32, u64, u64)> {
        index
            .query(&BoundingBox::world(), 3)
            .iter()
            .map(|r| {
                let c = r.coordinate();
                (r.point_count(), c.longitude.to_bits(), c.latitude.to_bits())
            })
            .collect()
    };
    assert_eq!(counts(&a), counts(&b));
}

#[test]
fn accepts_geo_traits_coordinates() {
    let coord = geo_0_31::coord! { x: 2.35, y: 48.85 };
    let index = ClusterIndex::new([Point::from_coord(&coord, ())], params(40.));
    assert_eq!(index.points()[0].longitude(), 2.35);
    assert_eq!(index.points()[0].latitude(), 48.85);
}
