use bevy::prelude::*;

/// Light text for menus over the dusk backdrop
pub const LABEL_TEXT: Color = Color::srgb(0.855, 0.882, 0.902);

/// Light text for headers
pub const HEADER_TEXT: Color = Color::srgb(0.925, 0.945, 0.960);

/// Near-white text for buttons
pub const BUTTON_TEXT: Color = Color::srgb(0.969, 0.976, 0.973);
/// #5a9e94
pub const BUTTON_BACKGROUND: Color = Color::srgb(0.353, 0.620, 0.580);
/// #7dbdb2
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.490, 0.741, 0.698);
/// #3f7a72
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.247, 0.478, 0.447);
