use crate::window::WindowGeometry;

/// 将截图像素坐标换算为屏幕坐标。
///
/// 截图是物理像素，窗口几何信息是逻辑像素；Retina/高 DPI 下两者不同，
/// 先按 `截图宽 / 窗口宽` 缩放回逻辑坐标，再加上窗口左上角位置。
pub fn capture_to_screen(
    point: (f64, f64),
    capture_size: (u32, u32),
    geometry: &WindowGeometry,
) -> (i32, i32) {
    let (img_w, img_h) = capture_size;
    let scale_x = scale(img_w, geometry.width);
    let scale_y = scale(img_h, geometry.height);

    let logical_x = point.0 / scale_x;
    let logical_y = point.1 / scale_y;

    (
        geometry.x + logical_x.round() as i32,
        geometry.y + logical_y.round() as i32,
    )
}

/// 窗口内比例坐标（0.0–1.0，超出范围会被截断）换算为屏幕坐标。
pub fn ratio_to_screen(x: f32, y: f32, geometry: &WindowGeometry) -> (i32, i32) {
    let x = x.clamp(0.0, 1.0);
    let y = y.clamp(0.0, 1.0);
    (
        geometry.x + (geometry.width as f32 * x).round() as i32,
        geometry.y + (geometry.height as f32 * y).round() as i32,
    )
}

fn scale(physical: u32, logical: u32) -> f64 {
    if physical == 0 || logical == 0 {
        1.0
    } else {
        physical as f64 / logical as f64
    }
}
