//! 装饰性元素：斜向色带、角落圆角条、随机点缀

use super::dice::Dice;
use super::palette::Palette;
use super::pptx::{AutoShape, Fill, Frame, Geometry, Rgb, Shadow, Shape};

/// 无边框的实心形状
pub fn filled(geometry: Geometry, frame: Frame, color: Rgb, transparency: f64) -> Shape {
    let fill = if transparency > 0.0 {
        Fill::transparent(color, transparency)
    } else {
        Fill::solid(color)
    };
    Shape::Auto(AutoShape {
        frame,
        geometry,
        fill: Some(fill),
        shadow: None,
    })
}

/// 内容页：一条斜向色带 + 三个圆角条
pub fn premium_content_elements(palette: &Palette) -> Vec<Shape> {
    let mut shapes = vec![filled(
        Geometry::Rect,
        Frame::inches(-2.0, 0.0, 12.0, 0.8).rotated(-20.0),
        palette.accent,
        0.15,
    )];

    // (x, y, w, h, 旋转, 颜色, 透明度)
    let corners = [
        (8.5, 0.5, 1.5, 0.3, 15.0, palette.secondary, 0.2),
        (0.5, 5.5, 2.0, 0.4, -15.0, palette.primary, 0.25),
        (6.0, 6.0, 1.0, 0.2, 0.0, palette.accent, 0.3),
    ];
    shapes.extend(corners.into_iter().map(|(x, y, w, h, rot, color, alpha)| {
        filled(
            Geometry::RoundRect,
            Frame::inches(x, y, w, h).rotated(rot),
            color,
            alpha,
        )
    }));
    shapes
}

/// 标题页：斜向色带 + 两个角落圆角条
pub fn premium_title_elements(palette: &Palette) -> Vec<Shape> {
    let mut shapes = vec![filled(
        Geometry::Rect,
        Frame::inches(-2.0, 1.0, 12.0, 0.6).rotated(-20.0),
        palette.accent,
        0.2,
    )];
    for (x, y, w, h, rot) in [(8.5, 0.5, 1.5, 0.3, 15.0), (0.5, 6.5, 2.0, 0.4, -15.0)] {
        shapes.push(filled(
            Geometry::RoundRect,
            Frame::inches(x, y, w, h).rotated(rot),
            palette.secondary,
            0.25,
        ));
    }
    shapes
}

/// 标题页底部的细线和角标
pub fn title_decoration(palette: &Palette, dice: &mut dyn Dice) -> Vec<Shape> {
    let line_geometry = [Geometry::RoundRect, Geometry::Ellipse][dice.pick(2)];
    vec![
        filled(
            line_geometry,
            Frame::inches(2.5, 5.5, 5.0, 0.05),
            palette.primary,
            0.0,
        ),
        filled(
            Geometry::RoundRect,
            Frame::inches(8.8, 6.8, 0.8, 0.4),
            palette.accent,
            0.0,
        ),
    ]
}

/// 一个随机点缀形状：随机几何、角度、尺寸、位置、颜色，一半概率带阴影
pub fn random_element(palette: &Palette, dice: &mut dyn Dice) -> Shape {
    let geometry = Geometry::ALL[dice.pick(Geometry::ALL.len())];
    let rotation = dice.range_i32(-45, 45) as f64;
    let width = dice.range_f64(0.5, 3.0);
    let height = dice.range_f64(0.1, 0.5);
    let x = dice.range_f64(-1.0, 10.0);
    let y = dice.range_f64(0.0, 7.0);

    let mut colors = vec![palette.accent, palette.secondary];
    if dice.unit() > 0.7 {
        colors.push(palette.text);
    }
    let color = colors[dice.pick(colors.len())];
    let transparency = dice.range_f64(0.2, 0.6);
    let shadow = (dice.unit() > 0.5).then(Shadow::soft);

    Shape::Auto(AutoShape {
        frame: Frame::inches(x, y, width, height).rotated(rotation),
        geometry,
        fill: Some(Fill::transparent(color, transparency)),
        shadow,
    })
}

/// 1-3 个随机点缀
pub fn random_elements(palette: &Palette, dice: &mut dyn Dice) -> Vec<Shape> {
    let count = dice.range_i32(1, 3);
    (0..count).map(|_| random_element(palette, dice)).collect()
}
