use std::fmt;

pub const MAX: usize = 10;
static mut COUNTER: u32 = 0;

/// fn documented() {}
pub struct Point {
    pub x: f64,
    y: f64,
}

pub enum Shape {
    Circle { radius: f64 },
}

pub trait Area {
    fn area(&self) -> f64;
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        let c = '{';
        Point { x, y }
    }
}

fn main() {
    fn helper() {}
}

macro_rules! square {
    ($x:expr) => { $x * $x };
}
