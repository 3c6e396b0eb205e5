use crate::coords::Vec2;
use crate::drawable::Drawable;
use crate::effects::transform_point;
use crate::skin::Silhouette;

/// Twice the signed area of the triangle `a, b, c`.
#[inline]
fn determinant(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Shape-space convex hull of the drawable's opaque pixels.
///
/// Scans each row of the skin (in skin units, effects applied) for its leftmost
/// and rightmost touching pixel and folds them into two monotone chains. Points
/// are pixel indices from the top-left corner, clockwise from the top-left.
///
/// The silhouette must be current.
pub(crate) fn convex_hull_points(drawable: &Drawable, silhouette: &Silhouette) -> Vec<Vec2> {
    let size = drawable.skin_size();
    if !drawable.visible() || size.x <= 0.0 || size.y <= 0.0 {
        return Vec::new();
    }

    let width = size.x.ceil() as i32;
    let height = size.y.ceil() as i32;
    let effects = drawable.effects();
    let touching = |x: i32, y: i32| {
        let pixel = Vec2::new((x as f32 + 0.5) / size.x, (y as f32 + 0.5) / size.y);
        silhouette.is_touching_linear(transform_point(effects, size, pixel))
    };

    let mut left: Vec<Vec2> = Vec::new();
    let mut right: Vec<Vec2> = Vec::new();

    for y in 0..height {
        let Some(lx) = (0..width).find(|&x| touching(x, y)) else {
            continue;
        };
        let point = Vec2::new(lx as f32, y as f32);
        while left.len() >= 2 {
            let n = left.len();
            if determinant(left[n - 1], left[n - 2], point) > 0.0 {
                break;
            }
            left.pop();
        }
        left.push(point);

        // A row with a leftmost pixel always has a rightmost one.
        let rx = (0..width).rev().find(|&x| touching(x, y)).unwrap_or(lx);
        let point = Vec2::new(rx as f32, y as f32);
        while right.len() >= 2 {
            let n = right.len();
            if determinant(right[n - 1], right[n - 2], point) < 0.0 {
                break;
            }
            right.pop();
        }
        right.push(point);
    }

    left.extend(right.into_iter().rev());
    left
}
