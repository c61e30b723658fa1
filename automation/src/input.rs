use anyhow::{Result, anyhow, bail};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use std::fmt;
use std::str::FromStr;
use std::{thread, time::Duration};

/// 按键标识：字母/数字按字符表示，其余为固定的功能键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Escape,
    Enter,
    Space,
    Tab,
}

impl KeyId {
    fn to_enigo(self) -> Key {
        match self {
            KeyId::Char(c) => Key::Unicode(c),
            KeyId::Up => Key::UpArrow,
            KeyId::Down => Key::DownArrow,
            KeyId::Left => Key::LeftArrow,
            KeyId::Right => Key::RightArrow,
            KeyId::Escape => Key::Escape,
            KeyId::Enter => Key::Return,
            KeyId::Space => Key::Space,
            KeyId::Tab => Key::Tab,
        }
    }

    /// 将按键名列表解析为 `KeyId`，任一名称无效即报错。
    pub fn parse_list(names: &[&str]) -> Result<Vec<KeyId>> {
        names.iter().map(|n| n.parse()).collect()
    }
}

impl FromStr for KeyId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "up" => KeyId::Up,
            "down" => KeyId::Down,
            "left" => KeyId::Left,
            "right" => KeyId::Right,
            "esc" | "escape" => KeyId::Escape,
            "enter" | "return" => KeyId::Enter,
            "space" => KeyId::Space,
            "tab" => KeyId::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => KeyId::Char(c),
                    _ => bail!("未知按键：{s:?}"),
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Char(c) => write!(f, "{c}"),
            KeyId::Up => f.write_str("up"),
            KeyId::Down => f.write_str("down"),
            KeyId::Left => f.write_str("left"),
            KeyId::Right => f.write_str("right"),
            KeyId::Escape => f.write_str("esc"),
            KeyId::Enter => f.write_str("enter"),
            KeyId::Space => f.write_str("space"),
            KeyId::Tab => f.write_str("tab"),
        }
    }
}

/// 输入注入接口：点击屏幕坐标、按下单个按键。
///
/// 一次调用即一个完整动作，调用返回后动作已经发出，不支持中途取消。
pub trait InputSink {
    fn click(&mut self, x: i32, y: i32) -> Result<()>;
    fn press_key(&mut self, key: KeyId) -> Result<()>;
}

/// 基于 `enigo` 的系统级输入注入。
pub struct EnigoInput {
    enigo: Enigo,
}

impl EnigoInput {
    /// 连接系统输入后端；macOS 未授予辅助功能权限时会失败。
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow!("无法初始化输入注入：{e}"))?;
        Ok(Self { enigo })
    }
}

impl InputSink for EnigoInput {
    /// 将鼠标移动到指定屏幕坐标并模拟一次左键点击。
    ///
    /// 为降低误触概率，会在移动后短暂停顿。
    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| anyhow!("移动鼠标失败：{e}"))?;
        thread::sleep(Duration::from_millis(60));
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| anyhow!("点击失败：{e}"))?;
        Ok(())
    }

    fn press_key(&mut self, key: KeyId) -> Result<()> {
        self.enigo
            .key(key.to_enigo(), Direction::Click)
            .map_err(|e| anyhow!("按键 {key} 失败：{e}"))?;
        Ok(())
    }
}
