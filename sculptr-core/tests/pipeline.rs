//! End-to-end tests: generate -> write -> parse -> view

use approx::assert_abs_diff_eq;
use sculptr_core::obj::to_obj_string;
use sculptr_core::{
    generate, load_obj, parse_obj, save_obj, GeometryError, Mesh, NormalSet, ObjWriteOptions,
    Primitive, ShadingMode, ShapeKind, Viewer, ViewerConfig,
};

fn all_shapes() -> Vec<(ShapeKind, Mesh)> {
    ShapeKind::ALL
        .iter()
        .map(|&kind| (kind, generate(&Primitive::default_for(kind)).unwrap()))
        .collect()
}

#[test]
fn test_round_trip_every_shape() {
    let options = ObjWriteOptions::default();
    for (kind, mesh) in all_shapes() {
        let parsed = parse_obj(&to_obj_string(&mesh, &options)).unwrap();
        assert_eq!(parsed.vertex_count(), mesh.vertex_count(), "{kind}");
        assert_eq!(parsed.faces(), mesh.faces(), "{kind}");
        for (a, b) in parsed.vertices().iter().zip(mesh.vertices()) {
            assert_abs_diff_eq!(a.coords, b.coords, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    for (kind, mesh) in all_shapes() {
        let path = dir.path().join(format!("{kind}.obj"));
        save_obj(&mesh, &path, &ObjWriteOptions::default()).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert_eq!(loaded.faces(), mesh.faces(), "{kind}");
    }
}

#[test]
fn test_bounds_contain_every_vertex() {
    for (kind, mesh) in all_shapes() {
        let bounds = mesh.bounds().unwrap();
        assert!(
            mesh.vertices().iter().all(|v| bounds.contains(v)),
            "{kind}"
        );
    }
}

#[test]
fn test_normals_are_unit_or_zero() {
    for (kind, mesh) in all_shapes() {
        for mode in [ShadingMode::Flat, ShadingMode::Smooth] {
            let normals = NormalSet::compute(&mesh, mode);
            for n in normals.as_slice() {
                let len = n.norm();
                assert!(
                    len == 0.0 || (len - 1.0).abs() < 1e-5,
                    "{kind} {mode:?}: |n| = {len}"
                );
            }
        }
    }
}

#[test]
fn test_negative_index_scenario() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 0 1\nf -1 -2 -3\n";
    let mesh = parse_obj(text).unwrap();
    assert_eq!(mesh.faces(), &[[4, 3, 2]]);
}

#[test]
fn test_viewer_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.obj");
    let bad = dir.path().join("bad.obj");
    let missing = dir.path().join("missing.obj");
    save_obj(
        &generate(&Primitive::default_for(ShapeKind::Cylinder)).unwrap(),
        &good,
        &ObjWriteOptions::default(),
    )
    .unwrap();
    std::fs::write(&bad, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\n").unwrap();

    let mut viewer = Viewer::new(ViewerConfig::default(), 800, 600);
    viewer.load_file(&good).unwrap();
    let before = viewer.mesh().clone();

    assert!(matches!(
        viewer.load_file(&bad),
        Err(GeometryError::Malformed { line: 4, .. })
    ));
    assert!(matches!(viewer.load_file(&missing), Err(GeometryError::Io(_))));
    assert_eq!(viewer.mesh(), &before);
}

#[test]
fn test_framed_shapes_fit_terminal_viewport() {
    // 80x24 cells, each twice as tall as wide.
    let (width, height) = (80, 24);
    let aspect = width as f32 * 0.5 / height as f32;
    for (kind, mesh) in all_shapes() {
        let mut viewer = Viewer::new(ViewerConfig::default(), width, height);
        viewer.camera_mut().set_aspect(aspect);
        viewer.load_mesh(mesh);
        let camera = viewer.camera();
        for v in viewer.mesh().vertices() {
            assert!(
                camera.project_to_screen(v, width, height).is_some(),
                "{kind}: {v:?} outside the view"
            );
        }
    }
}

#[test]
fn test_non_finite_obj_is_rejected() {
    let err = parse_obj("v inf 0 0\nv 1 1 1\nv 0 1 0\nf 1 2 3\n").unwrap_err();
    assert!(matches!(err, GeometryError::Malformed { line: 1, .. }));
    let err = parse_obj("v 0 0 0\nv 0 nan 0\nv 0 1 0\nf 1 2 3\n").unwrap_err();
    assert!(matches!(err, GeometryError::Malformed { line: 2, .. }));
}
