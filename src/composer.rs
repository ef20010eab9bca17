//! Builds the creature's transform hierarchy for one frame.
//!
//! [`SceneComposer::compose_frame`] is rebuilt from scratch every tick and
//! keeps nothing between frames. It walks the hierarchy
//!
//! ```text
//! global rotation
//! ├── body ─┬─ stripes
//! │         └─ tail base ── tail mid ── tail tip
//! ├── head anchor ─┬─ head
//! │                ├─ ears
//! │                └─ nose → eye → eye → cheek → cheek   (one running transform)
//! ├── feet
//! └── arms
//! ```
//!
//! and emits the parts in a fixed draw order. The output is not depth sorted;
//! the pipeline's depth test handles occlusion.
//!
//! The facial features are deliberately chained: each one keeps mutating the
//! transform left behind by the previous feature instead of restarting from
//! the head anchor, so the eye scale also shifts and grows the cheeks.

use glam::Mat4;

use crate::color::Color;
use crate::mesh::DEFAULT_CONE_SLICES;
use crate::pose::Pose;
use crate::primitive::{Cone, Cube, Primitive};
use crate::transform::Transform;

pub const BODY_COLOR: Color = Color::rgb(1.0, 0.85, 0.1);
pub const LIMB_COLOR: Color = Color::rgb(0.96, 0.8, 0.08);
pub const STRIPE_COLOR: Color = Color::rgb(0.45, 0.25, 0.08);
pub const FACE_COLOR: Color = Color::rgb(0.08, 0.08, 0.08);

/// Where the body's unit cube corner sits before scaling.
pub const BODY_ANCHOR: [f32; 3] = [-0.235, -0.5, 0.1];
pub const BODY_SCALE: [f32; 3] = [0.4, 0.6, 0.4];

/// Heights of the back stripes above the body origin.
const STRIPE_HEIGHTS: [f32; 2] = [0.3, 0.42];
/// Stripes sit this far behind the body's back face.
const STRIPE_DEPTH_OFFSET: f32 = 0.001;

/// Rest angles of the tail links; pose angles add to these.
const TAIL_REST: [f32; 3] = [-35.0, 80.0, -80.0];

/// What a part of the model represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Body,
    Stripe,
    Tail,
    Head,
    Ear,
    Nose,
    Eye,
    Cheek,
    Foot,
    Arm,
}

/// One primitive of the model with its part-local transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub kind: PartKind,
    pub primitive: Primitive,
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameCommands {
    /// Outermost transform, uploaded once per frame as its own uniform.
    pub global_rotation: Transform,
    /// Parts in draw order.
    pub parts: Vec<Part>,
}

impl FrameCommands {
    /// The effective world matrix of a part: global rotation outside the part's own transform.
    pub fn world_matrix(&self, part: &Part) -> Mat4 {
        self.global_rotation.matrix() * part.primitive.model_matrix()
    }

    /// Parts of one kind, in draw order.
    pub fn parts_of(&self, kind: PartKind) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(move |p| p.kind == kind)
    }
}

/// Stateless builder of [`FrameCommands`].
#[derive(Clone, Copy, Debug)]
pub struct SceneComposer {
    ear_slices: u32,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self {
            ear_slices: DEFAULT_CONE_SLICES,
        }
    }
}

impl SceneComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cone resolution used for the ears.
    pub fn ear_slices(mut self, slices: u32) -> Self {
        self.ear_slices = slices;
        self
    }

    /// Composes the full model for `pose`, rotated by `global_rotation`
    /// degrees about the up axis.
    pub fn compose_frame(&self, pose: &Pose, global_rotation: f32) -> FrameCommands {
        let mut global = Transform::new();
        global.rotate(global_rotation, 0.0, 1.0, 0.0);

        let mut parts = Vec::with_capacity(18);
        let mut push = |kind: PartKind, primitive: Primitive| parts.push(Part { kind, primitive });

        // Body
        let [bx, by, bz] = BODY_ANCHOR;
        let [sx, sy, sz] = BODY_SCALE;
        let mut body = Transform::new();
        body.translate(bx, by, bz);
        let body_origin = body.clone();
        body.scale(sx, sy, sz);
        push(PartKind::Body, Cube::new(BODY_COLOR, body).into());

        // Back stripes
        for height in STRIPE_HEIGHTS {
            let mut stripe = body_origin.clone();
            stripe
                .translate(0.0, height, STRIPE_DEPTH_OFFSET)
                .scale(sx, 0.05, 0.02);
            push(PartKind::Stripe, Cube::new(STRIPE_COLOR, stripe).into());
        }

        // Tail: each link pivots at the end of its parent.
        let mut tail = body_origin.clone();
        tail.translate(0.175, 0.08, 0.06)
            .rotate(TAIL_REST[0] + pose.tail_base + pose.tail_twitch, 0.0, 0.0, 1.0);
        let tail_mid_anchor = tail.clone();
        tail.scale(0.05, 0.2, 0.05);
        push(PartKind::Tail, Cube::new(STRIPE_COLOR, tail).into());

        let mut tail_mid = tail_mid_anchor;
        tail_mid
            .translate(0.0, 0.18, 0.0)
            .rotate(TAIL_REST[1] + pose.tail_mid, 0.0, 0.0, 1.0);
        let tail_tip_anchor = tail_mid.clone();
        tail_mid.scale(0.06, 0.2, 0.05);
        push(PartKind::Tail, Cube::new(BODY_COLOR, tail_mid).into());

        let mut tail_tip = tail_tip_anchor;
        tail_tip
            .translate(0.0, 0.18, 0.0)
            .rotate(TAIL_REST[2] + pose.tail_tip, 0.0, 0.0, 1.0)
            .scale(0.16, 0.3, 0.05);
        push(PartKind::Tail, Cube::new(BODY_COLOR, tail_tip).into());

        // Head, pivoting at the neck
        let mut head_anchor = Transform::new();
        head_anchor
            .translate(-0.035, 0.05, 0.0)
            .rotate(pose.head, 0.0, 0.0, 1.0)
            .translate(-0.25, 0.0, 0.0);

        let mut head = head_anchor.clone();
        head.scale(0.5, 0.45, 0.5);
        push(PartKind::Head, Cube::new(BODY_COLOR, head).into());

        // Ears
        let mut left_ear = head_anchor.clone();
        left_ear
            .translate(0.1, 0.4, -0.25)
            .rotate(25.0, 0.0, 0.0, 1.0)
            .scale(0.07, 0.35, 0.07);
        push(
            PartKind::Ear,
            Cone::new(BODY_COLOR, left_ear).slices(self.ear_slices).into(),
        );

        let mut right_ear = head_anchor.clone();
        right_ear
            .translate(0.4, 0.4, -0.25)
            .rotate(-25.0, 0.0, 0.0, 1.0)
            .rotate(1.0, 1.0, 0.0, 0.5)
            .scale(0.07, 0.35, 0.07);
        push(
            PartKind::Ear,
            Cone::new(BODY_COLOR, right_ear).slices(self.ear_slices).into(),
        );

        // Face: one running transform, each feature relative to the previous one.
        let mut face = head_anchor;
        face.translate(0.22, 0.18, -0.5).scale(0.06, 0.04, 0.01);
        push(PartKind::Nose, Cube::new(FACE_COLOR, face.clone()).into());

        let eye = pose.eye_scale;
        face.translate(-2.333, 1.75, 0.0)
            .scale(1.167 * eye, 2.0 * eye, 1.0);
        push(PartKind::Eye, Cube::new(FACE_COLOR, face.clone()).into());

        face.translate(3.714, 0.0, 0.0);
        push(PartKind::Eye, Cube::new(FACE_COLOR, face.clone()).into());

        face.translate(-4.571, -2.125, 0.0).scale(1.429, 1.0, 1.0);
        push(PartKind::Cheek, Cube::new(pose.cheek_color, face.clone()).into());

        face.translate(3.6, 0.0, 0.0);
        push(PartKind::Cheek, Cube::new(pose.cheek_color, face).into());

        // Feet, each from identity; the second foot mirrors its rotation.
        let mut left_foot = Transform::new();
        left_foot
            .translate(-0.22, -0.58, -0.05)
            .rotate(pose.left_foot, 1.0, 0.0, 0.0)
            .scale(0.14, 0.08, 0.2);
        push(PartKind::Foot, Cube::new(LIMB_COLOR, left_foot).into());

        let mut right_foot = Transform::new();
        right_foot
            .translate(0.01, -0.58, -0.05)
            .rotate(-pose.right_foot, 1.0, 0.0, 0.0)
            .scale(0.14, 0.08, 0.2);
        push(PartKind::Foot, Cube::new(LIMB_COLOR, right_foot).into());

        // Arms
        let mut left_arm = Transform::new();
        left_arm
            .translate(-0.2, -0.05, -0.32)
            .rotate(pose.left_arm, 0.0, 0.0, 1.0)
            .scale(0.07, 0.22, 0.07);
        push(PartKind::Arm, Cube::new(LIMB_COLOR, left_arm).into());

        let mut right_arm = Transform::new();
        right_arm
            .translate(0.13, -0.05, -0.32)
            .rotate(pose.right_arm, 0.0, 0.0, 1.0)
            .scale(0.07, 0.22, 0.07);
        push(PartKind::Arm, Cube::new(LIMB_COLOR, right_arm).into());

        FrameCommands {
            global_rotation: global,
            parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Joint;
    use glam::Vec3;

    fn compose(pose: &Pose, rotation: f32) -> FrameCommands {
        SceneComposer::new().compose_frame(pose, rotation)
    }

    fn origin_of(frame: &FrameCommands, kind: PartKind, index: usize) -> Vec3 {
        let part = frame.parts_of(kind).nth(index).unwrap();
        frame.world_matrix(part).transform_point3(Vec3::ZERO)
    }

    #[test]
    fn draw_order_is_fixed() {
        use PartKind::*;
        let frame = compose(&Pose::new(), 0.0);
        let kinds: Vec<_> = frame.parts.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Body, Stripe, Stripe, Tail, Tail, Tail, Head, Ear, Ear, Nose, Eye, Eye, Cheek,
                Cheek, Foot, Foot, Arm, Arm
            ]
        );
    }

    #[test]
    fn ears_are_cones_everything_else_cubes() {
        let frame = compose(&Pose::new(), 0.0);
        for part in &frame.parts {
            let is_cone = matches!(part.primitive, Primitive::Cone(_));
            assert_eq!(is_cone, part.kind == PartKind::Ear, "{:?}", part.kind);
        }
    }

    #[test]
    fn body_sits_at_its_anchor_with_no_rotation() {
        let frame = compose(&Pose::zeroed(), 0.0);
        let body = frame.parts_of(PartKind::Body).next().unwrap();
        let world = frame.world_matrix(body);

        let expected = Mat4::from_translation(Vec3::new(-0.235, -0.5, 0.1))
            * Mat4::from_scale(Vec3::new(0.4, 0.6, 0.4));
        assert!(world.abs_diff_eq(expected, 1e-6));
        assert!(
            world
                .w_axis
                .truncate()
                .abs_diff_eq(Vec3::new(-0.235, -0.5, 0.1), 1e-6)
        );
    }

    #[test]
    fn global_rotation_wraps_every_part() {
        let pose = Pose::new();
        let still = compose(&pose, 0.0);
        let turned = compose(&pose, 90.0);
        let spin = Mat4::from_rotation_y(90f32.to_radians());

        for (a, b) in still.parts.iter().zip(&turned.parts) {
            // Parts themselves are unchanged; only the outer uniform differs.
            assert_eq!(a, b);
            let expected = spin * still.world_matrix(a);
            assert!(turned.world_matrix(b).abs_diff_eq(expected, 1e-5));
        }
    }

    #[test]
    fn tail_links_pivot_at_their_parent() {
        let mut pose = Pose::new();
        let rest = compose(&pose, 0.0);
        pose.set_angle(Joint::TailTip, 40.0);
        let bent = compose(&pose, 0.0);

        // Bending the tip moves neither the base nor the pivot of the tip.
        assert_eq!(
            rest.parts_of(PartKind::Tail).next(),
            bent.parts_of(PartKind::Tail).next()
        );
        assert!(
            origin_of(&rest, PartKind::Tail, 2)
                .abs_diff_eq(origin_of(&bent, PartKind::Tail, 2), 1e-6)
        );
        assert_ne!(
            rest.parts_of(PartKind::Tail).nth(2),
            bent.parts_of(PartKind::Tail).nth(2)
        );
    }

    #[test]
    fn tail_base_carries_the_whole_chain() {
        let mut pose = Pose::new();
        let rest = compose(&pose, 0.0);
        pose.set_angle(Joint::TailBase, 30.0);
        let bent = compose(&pose, 0.0);

        for i in 1..3 {
            assert!(
                !origin_of(&rest, PartKind::Tail, i)
                    .abs_diff_eq(origin_of(&bent, PartKind::Tail, i), 1e-4)
            );
        }
    }

    #[test]
    fn head_angle_moves_face_but_not_limbs() {
        let mut pose = Pose::new();
        let rest = compose(&pose, 0.0);
        pose.set_angle(Joint::Head, 20.0);
        let tilted = compose(&pose, 0.0);

        for kind in [PartKind::Ear, PartKind::Nose, PartKind::Eye, PartKind::Cheek] {
            assert!(!origin_of(&rest, kind, 0).abs_diff_eq(origin_of(&tilted, kind, 0), 1e-4));
        }
        for kind in [PartKind::Body, PartKind::Foot, PartKind::Arm, PartKind::Tail] {
            assert_eq!(rest.parts_of(kind).next(), tilted.parts_of(kind).next());
        }
    }

    #[test]
    fn face_features_chain_through_the_eye_scale() {
        let mut pose = Pose::new();
        let rest = compose(&pose, 0.0);
        pose.eye_scale = 1.5;
        let wide = compose(&pose, 0.0);

        // The nose is before the eyes in the chain and is unaffected.
        assert_eq!(
            rest.parts_of(PartKind::Nose).next(),
            wide.parts_of(PartKind::Nose).next()
        );
        // The cheeks continue from the scaled eye transform and move.
        assert!(
            !origin_of(&rest, PartKind::Cheek, 0)
                .abs_diff_eq(origin_of(&wide, PartKind::Cheek, 0), 1e-4)
        );
    }

    #[test]
    fn face_sits_on_the_front_of_the_head() {
        let frame = compose(&Pose::new(), 0.0);
        let head = frame.parts_of(PartKind::Head).next().unwrap();
        let head_world = frame.world_matrix(head);
        let head_min = head_world.transform_point3(Vec3::new(0.0, 0.0, -1.0));
        let head_max = head_world.transform_point3(Vec3::new(1.0, 1.0, 0.0));

        for kind in [PartKind::Nose, PartKind::Eye, PartKind::Cheek] {
            for part in frame.parts_of(kind) {
                let world = frame.world_matrix(part);
                let lo = world.transform_point3(Vec3::new(0.0, 0.0, 0.0));
                let hi = world.transform_point3(Vec3::new(1.0, 1.0, 0.0));
                assert!(lo.x >= head_min.x - 1e-3 && hi.x <= head_max.x + 1e-3, "{kind:?} x");
                assert!(lo.y >= head_min.y - 1e-3 && hi.y <= head_max.y + 1e-3, "{kind:?} y");
            }
        }
    }

    /// Offset of each foot's toe corner from its own origin.
    fn toe_offsets(frame: &FrameCommands) -> (Vec3, Vec3) {
        let toe = Vec3::new(0.0, 0.0, -1.0);
        let offset = |i: usize| {
            let foot = frame.parts_of(PartKind::Foot).nth(i).unwrap();
            frame.world_matrix(foot).transform_point3(toe) - origin_of(frame, PartKind::Foot, i)
        };
        (offset(0), offset(1))
    }

    #[test]
    fn feet_mirror_their_rotation() {
        let mut pose = Pose::new();
        pose.set_angle(Joint::LeftFoot, 20.0);
        pose.set_angle(Joint::RightFoot, 20.0);

        let (left, right) = toe_offsets(&compose(&pose, 0.0));
        assert!((left.y + right.y).abs() < 1e-5);
        assert!(left.y.abs() > 1e-3);
    }

    #[test]
    fn animated_feet_swing_in_opposition() {
        let mut pose = Pose::new();
        pose.set_auto_animate(true);
        for t in [0.3, 0.7, 1.1] {
            pose.update(t);
            let (left, right) = toe_offsets(&compose(&pose, 0.0));
            assert!(left.y.abs() > 1e-3, "no swing at t={t}");
            assert!((left.y + right.y).abs() < 1e-5, "feet in phase at t={t}");
        }
    }

    #[test]
    fn stripes_clear_the_body_back_face() {
        let frame = compose(&Pose::new(), 0.0);
        let back = BODY_ANCHOR[2];
        for stripe in frame.parts_of(PartKind::Stripe) {
            let z = frame.world_matrix(stripe).transform_point3(Vec3::ZERO).z;
            assert!(z > back && z - back < 0.01);
        }
    }

    #[test]
    fn cheeks_take_the_pose_color() {
        let mut pose = Pose::new();
        pose.cheek_color = Color::rgb(0.0, 1.0, 0.0);
        let frame = compose(&pose, 0.0);
        assert!(frame.parts_of(PartKind::Cheek).all(|p| p.primitive.color() == pose.cheek_color));
    }

    #[test]
    fn ear_slices_are_configurable() {
        let frame = SceneComposer::new().ear_slices(5).compose_frame(&Pose::new(), 0.0);
        for ear in frame.parts_of(PartKind::Ear) {
            match &ear.primitive {
                Primitive::Cone(cone) => assert_eq!(cone.slices, 5),
                other => panic!("ear is not a cone: {other:?}"),
            }
        }
    }
}
