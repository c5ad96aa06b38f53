use approx::assert_relative_eq;
use bolt_builder::*;
use bolt_kernel::{
    FaceSurface, JournalingKernel, Kernel, KernelCall, KernelIntrospect, MockKernel, NoThreadData,
};
use bolt_types::{ConstructionPlane, FeatureOperation, Point2};

fn journaled() -> JournalingKernel<MockKernel> {
    JournalingKernel::new(MockKernel::new())
}

fn build_default(kernel: &mut JournalingKernel<MockKernel>) -> Result<BoltBuild, BuildError> {
    BoltBuilder::new(kernel).build(&BoltParameters::default())
}

fn raw_with(edit: impl FnOnce(&mut RawBoltParameters)) -> RawBoltParameters {
    let mut raw = RawBoltParameters::default();
    edit(&mut raw);
    raw
}

fn build_raw(
    kernel: &mut JournalingKernel<MockKernel>,
    raw: &RawBoltParameters,
) -> Result<BoltBuild, BuildError> {
    BoltBuilder::new(kernel).build_from_raw(raw, &UnitsManager::new())
}

#[test]
fn default_bolt_is_one_named_threaded_body() {
    let mut kernel = journaled();
    let build = build_default(&mut kernel).unwrap();

    assert_eq!(kernel.inner().bodies(), vec![build.body]);
    assert_eq!(kernel.body_name(build.body).as_deref(), Some("Bolt"));
    assert_eq!(build.name, "Bolt");
    // 8 head + 2 shaft + chamfer + fillet + 2 x 6 under-head patches
    assert_eq!(build.face_count, 24);
    assert_eq!(kernel.body_faces(build.body).len(), 24);

    let thread = build.thread.as_ref().unwrap();
    assert_eq!(thread.designation, "M5x0.8");
    assert_eq!(thread.class, "6g");
    assert!(!thread.internal);
    assert!(build.threaded());
}

#[test]
fn thread_lands_on_the_shaft_cylinder() {
    let mut kernel = journaled();
    let build = build_default(&mut kernel).unwrap();

    let threaded: Vec<_> = kernel
        .body_faces(build.body)
        .into_iter()
        .filter(|&f| kernel.face_thread(f).is_some())
        .collect();
    assert_eq!(threaded.len(), 1);
    match kernel.face_surface(threaded[0]) {
        Some(FaceSurface::Cylindrical { radius, .. }) => {
            assert_relative_eq!(radius, 0.25, epsilon = 1e-12)
        }
        other => panic!("thread on {:?}", other),
    }
}

#[test]
fn journal_follows_stage_order() {
    let mut kernel = journaled();
    build_default(&mut kernel).unwrap();

    let names: Vec<&str> = kernel.journal().iter().map(KernelCall::name).collect();
    let mut expected = vec!["create_component", "create_sketch"];
    expected.extend(["add_line"; 6]);
    expected.extend(["profiles", "extrude", "rename_body"]);
    expected.extend(["create_sketch", "add_circle", "profiles", "extrude"]);
    expected.extend(["chamfer", "fillet"]);
    expected.push("create_sketch");
    expected.extend(["add_line"; 6]);
    expected.extend(["profiles", "revolve", "revolve"]);
    expected.extend([
        "default_metric_thread_type",
        "recommend_thread_data",
        "apply_thread",
    ]);
    assert_eq!(names, expected);
}

#[test]
fn journal_arguments_match_the_recipe() {
    let mut kernel = journaled();
    build_default(&mut kernel).unwrap();
    let journal = kernel.journal();

    assert_eq!(
        journal[0],
        KernelCall::CreateComponent {
            name: "Bolt".to_string()
        }
    );
    assert!(matches!(
        journal[1],
        KernelCall::CreateSketch {
            plane: ConstructionPlane::XY,
            ..
        }
    ));
    // First hexagon side runs from the 60 degree corner back to the 0 degree one.
    match &journal[2] {
        KernelCall::AddLine { start, end, .. } => {
            assert_relative_eq!(start.x, 0.1875, epsilon = 1e-12);
            assert_relative_eq!(start.y, 0.375 * 3f64.sqrt() / 2.0, epsilon = 1e-12);
            assert_eq!(*end, Point2::new(0.375, 0.0));
        }
        other => panic!("expected add_line, got {:?}", other),
    }

    let extrudes: Vec<_> = journal
        .iter()
        .filter_map(|c| match c {
            KernelCall::Extrude { spec, .. } => Some(*spec),
            _ => None,
        })
        .collect();
    assert_eq!(extrudes[0].operation, FeatureOperation::NewBody);
    assert_relative_eq!(extrudes[0].distance, 0.3125);
    assert_eq!(extrudes[1].operation, FeatureOperation::Join);
    assert_eq!(extrudes[1].direction, bolt_types::ExtentDirection::Negative);
    assert_relative_eq!(extrudes[1].distance, 2.0);

    let fillet = journal
        .iter()
        .find_map(|c| match c {
            KernelCall::Fillet {
                edges,
                radius,
                tangent_chain,
                ..
            } => Some((edges.len(), *radius, *tangent_chain)),
            _ => None,
        })
        .unwrap();
    assert_eq!(fillet.0, 1);
    assert_relative_eq!(fillet.1, 0.02994);
    assert!(fillet.2);

    for call in journal {
        if let KernelCall::Revolve { spec, .. } = call {
            assert_eq!(spec.operation, FeatureOperation::Cut);
            assert_relative_eq!(spec.angle, std::f64::consts::TAU);
        }
    }
}

#[test]
fn stage_records_cover_every_feature() {
    let mut kernel = journaled();
    let build = build_default(&mut kernel).unwrap();

    let stages: Vec<Stage> = build.stages.iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Head,
            Stage::Body,
            Stage::Chamfer,
            Stage::Fillet,
            Stage::UnderHeadCut,
            Stage::UnderHeadCut,
            Stage::Thread,
        ]
    );
    assert_eq!(build.stages[0].faces_created, 8);
    assert_eq!(build.stages[1].faces_created, 2);
    assert_eq!(build.stages[4].faces_created, 6);
    assert_eq!(build.stages[6].faces_created, 0);
}

#[test]
fn build_report_serializes() {
    let mut kernel = journaled();
    let build = build_default(&mut kernel).unwrap();

    let json = serde_json::to_value(&build).unwrap();
    assert_eq!(json["face_count"], 24);
    assert_eq!(json["stages"][0]["stage"], "head");
    assert_eq!(json["stages"][4]["stage"], "under_head_cut");
    assert_eq!(json["thread"]["designation"], "M5x0.8");
}

#[test]
fn invalid_parameters_make_no_kernel_calls() {
    let mut kernel = journaled();
    let raw = raw_with(|r| r.head_diameter = 0.4.into());

    let err = build_raw(&mut kernel, &raw).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Validation(ValidationError::HeadNotWiderThanBody { .. })
    ));
    assert!(kernel.journal().is_empty());
    assert!(kernel.inner().bodies().is_empty());
}

#[test]
fn cut_angle_bounds_rejected_before_kernel() {
    for angle in ["0", "90 deg"] {
        let mut kernel = journaled();
        let raw = raw_with(|r| r.cut_angle = angle.into());
        let err = build_raw(&mut kernel, &raw).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Validation(ValidationError::CutAngleOutOfRange { .. })
        ));
        assert!(kernel.journal().is_empty());
    }
}

#[test]
fn raw_expressions_build() {
    let mut kernel = journaled();
    let raw = raw_with(|r| {
        r.head_diameter = "7.5 mm".into();
        r.body_length = "1 in".into();
        r.cut_angle = "PI/6 rad".into();
    });
    let build = build_raw(&mut kernel, &raw).unwrap();
    assert_eq!(build.face_count, 24);
    let extrude_lengths: Vec<f64> = kernel
        .journal()
        .iter()
        .filter_map(|c| match c {
            KernelCall::Extrude { spec, .. } => Some(spec.distance),
            _ => None,
        })
        .collect();
    assert_relative_eq!(extrude_lengths[1], 2.54, epsilon = 1e-12);
}

#[test]
fn two_builds_make_two_bodies() {
    let mut kernel = journaled();
    let first = build_default(&mut kernel).unwrap();
    let second = build_default(&mut kernel).unwrap();

    assert_ne!(first.body, second.body);
    assert_ne!(first.component, second.component);
    assert_ne!(first.build_id, second.build_id);
    assert_eq!(kernel.inner().bodies().len(), 2);

    let faces_a = kernel.body_faces(first.body);
    let faces_b = kernel.body_faces(second.body);
    assert_eq!(faces_a.len(), 24);
    assert_eq!(faces_b.len(), 24);
    assert!(faces_a.iter().all(|f| !faces_b.contains(f)));

    // Each build's context starts empty: records never carry over.
    assert_eq!(first.stages.len(), second.stages.len());
    assert!(second
        .stages
        .iter()
        .all(|r| first.stages.iter().all(|o| o.feature != r.feature)));
}

#[test]
fn missing_thread_data_skips_thread() {
    let mut kernel =
        JournalingKernel::new(MockKernel::new().with_thread_data(Box::new(NoThreadData)));
    let build = build_default(&mut kernel).unwrap();

    assert!(build.thread.is_none());
    assert_eq!(build.face_count, 24);
    assert!(kernel
        .body_faces(build.body)
        .into_iter()
        .all(|f| kernel.face_thread(f).is_none()));
    assert!(matches!(
        kernel.journal().last(),
        Some(KernelCall::RecommendThreadData { .. })
    ));
    assert!(build.stages.iter().all(|r| r.stage != Stage::Thread));
}

#[test]
fn unmatched_diameter_skips_thread() {
    // 0.43 cm sits between M4 and M5 and outside the size tolerance.
    let mut kernel = journaled();
    let raw = raw_with(|r| r.body_diameter = 0.43.into());
    let build = build_raw(&mut kernel, &raw).unwrap();
    assert!(!build.threaded());
}

#[test]
fn thread_stage_can_be_disabled() {
    let mut kernel = journaled();
    let build = BoltBuilder::new(&mut kernel)
        .with_threads(false)
        .build(&BoltParameters::default())
        .unwrap();

    assert!(build.thread.is_none());
    assert!(kernel
        .journal()
        .iter()
        .all(|c| !matches!(c, KernelCall::DefaultMetricThreadType)));
}

#[test]
fn oversized_chamfer_names_its_stage() {
    let mut kernel = journaled();
    let raw = raw_with(|r| r.chamfer_distance = 0.3.into());
    let err = build_raw(&mut kernel, &raw).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Chamfer));
    assert!(err.to_string().starts_with("chamfer stage failed"));
}

#[test]
fn oversized_fillet_names_its_stage() {
    // Room on the head face is apothem - shaft radius, about 0.0748.
    let mut kernel = journaled();
    let raw = raw_with(|r| r.fillet_radius = 0.1.into());
    let err = build_raw(&mut kernel, &raw).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Fillet));
}

#[test]
fn shaft_wider_than_hexagon_flats_still_builds() {
    // Apothem diameter is about 0.6495; the shaft overlaps the hexagon sides.
    // Fillet room on the head face shrinks to 0.35 - 0.3248.
    let mut kernel = journaled();
    let raw = raw_with(|r| {
        r.body_diameter = 0.7.into();
        r.fillet_radius = 0.01.into();
    });
    let build = build_raw(&mut kernel, &raw).unwrap();

    assert_eq!(kernel.inner().bodies(), vec![build.body]);
    // The first under-head cut also exposes the shaft shoulder outside the flats.
    assert_eq!(build.face_count, 25);
    let cuts: Vec<&StageRecord> = build
        .stages
        .iter()
        .filter(|r| r.stage == Stage::UnderHeadCut)
        .collect();
    assert_eq!(cuts[0].faces_created, 7);
    assert_eq!(cuts[1].faces_created, 6);
}

#[test]
fn wide_shaft_with_default_fillet_fails_at_the_fillet() {
    let mut kernel = journaled();
    let raw = raw_with(|r| r.body_diameter = 0.7.into());
    let err = build_raw(&mut kernel, &raw).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Fillet));
}

#[test]
fn steep_cut_angles_build() {
    for (degrees, head_height) in [(86.0, 0.3125), (89.0, 0.3125), (84.0, 0.05), (89.0, 0.05)] {
        let mut kernel = journaled();
        let raw = raw_with(|r| {
            r.cut_angle = format!("{degrees} deg").into();
            r.head_height = head_height.into();
        });
        let build = build_raw(&mut kernel, &raw)
            .unwrap_or_else(|e| panic!("{degrees} deg, head {head_height}: {e}"));
        assert_eq!(build.face_count, 24, "{degrees} deg, head {head_height}");
    }
}

#[test]
fn shallow_cut_angle_builds() {
    let mut kernel = journaled();
    let raw = raw_with(|r| r.cut_angle = "0.5 deg".into());
    let build = build_raw(&mut kernel, &raw).unwrap();
    assert_eq!(build.face_count, 24);
}

#[test]
fn rejected_component_is_a_resource_error() {
    let mut kernel = journaled();
    kernel.inner_mut().set_reject_components(true);
    let err = build_default(&mut kernel).unwrap_err();

    assert!(matches!(err, BuildError::Resource(_)));
    assert_eq!(err.stage(), None);
    assert_eq!(kernel.journal().len(), 1);
}

#[test]
fn bare_mock_kernel_builds_too() {
    let mut kernel = MockKernel::new();
    let build = BoltBuilder::new(&mut kernel)
        .build(&BoltParameters::default())
        .unwrap();
    assert_eq!(build.face_count, 24);
    assert_eq!(
        kernel.component_name(build.component),
        Some("Bolt")
    );
    // Kernel calls go through the trait on the bare kernel as well.
    assert!(kernel.create_component("spare").is_ok());
}

#[test]
fn published_geometry_helpers() {
    let v = hexagon_vertices(Point2::new(0.0, 0.0), 0.75);
    assert_relative_eq!(v[0].x, 0.375);
    assert_relative_eq!(v[3].x, -0.375, epsilon = 1e-12);

    let [low, high] = under_head_triangles(0.75, 0.3125, std::f64::consts::FRAC_PI_6);
    assert_relative_eq!(low[0].x, 0.3248, epsilon = 1e-4);
    assert_relative_eq!(low[2].y, 0.0290, epsilon = 1e-4);
    assert_relative_eq!(high[2].y, 0.3125 - 0.0290, epsilon = 1e-4);
}
