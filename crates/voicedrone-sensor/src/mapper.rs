use voicedrone_core::{DepthPoint, DepthResolution, HandPosition, SurfaceSize};

/// Linearly rescale a depth-image point onto a surface of the given size.
///
/// Points outside the depth image map outside the surface; callers place the
/// marker there anyway.
pub fn map_to_surface(
    point: DepthPoint,
    resolution: DepthResolution,
    target: SurfaceSize,
) -> HandPosition {
    HandPosition {
        x: point.x * target.width / resolution.width,
        y: point.y * target.height / resolution.height,
    }
}
