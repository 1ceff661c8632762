//! Geometric codecs: sequences of float64 pairs in binary; text format
//! follows PostgreSQL's own printed representation for each shape.

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::geometric::{Box2d, Circle, Line, LineSegment, Path, Point, Polygon};
use crate::wire;

fn parse_floats(oid: Oid, name: Option<&str>, text: &str, trim: &[char]) -> Result<Vec<f64>> {
    text.trim_matches(|c: char| trim.contains(&c))
        .split(',')
        .map(|part| {
            part.trim_matches(|c: char| trim.contains(&c))
                .trim()
                .parse()
                .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected a float"))
        })
        .collect()
}

impl<'a> FromSqlValue<'a> for Point {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let nums = parse_floats(oid, name, text, &['(', ')'])?;
        match nums.as_slice() {
            [x, y] => Ok(Point { x: *x, y: *y }),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (x,y)")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 16 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 16 bytes"));
        }
        let x = wire::read_f64(oid, name, &bytes[0..8])?;
        let y = wire::read_f64(oid, name, &bytes[8..16])?;
        Ok(Point { x, y })
    }
}

impl ToSqlValue for Point {
    fn natural_oid(&self) -> Oid {
        oid::POINT
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("({},{})", self.x, self.y).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_f64(buf, self.x);
        wire::put_f64(buf, self.y);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for LineSegment {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let nums = parse_floats(oid, name, text, &['[', ']', '(', ')'])?;
        match nums.as_slice() {
            [x1, y1, x2, y2] => Ok(LineSegment { p1: Point { x: *x1, y: *y1 }, p2: Point { x: *x2, y: *y2 } }),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected [(x1,y1),(x2,y2)]")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 32 bytes"));
        }
        let p1 = Point::from_sql_binary(oid, name, &bytes[0..16])?;
        let p2 = Point::from_sql_binary(oid, name, &bytes[16..32])?;
        Ok(LineSegment { p1, p2 })
    }
}

impl ToSqlValue for LineSegment {
    fn natural_oid(&self) -> Oid {
        oid::LSEG
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("[({},{}),({},{})]", self.p1.x, self.p1.y, self.p2.x, self.p2.y).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.p1.encode_binary(oid, name, buf)?;
        self.p2.encode_binary(oid, name, buf)
    }
}

impl<'a> FromSqlValue<'a> for Box2d {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let nums = parse_floats(oid, name, text, &['(', ')'])?;
        match nums.as_slice() {
            [x1, y1, x2, y2] => Ok(Box2d { high: Point { x: *x1, y: *y1 }, low: Point { x: *x2, y: *y2 } }),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (x1,y1),(x2,y2)")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 32 bytes"));
        }
        let high = Point::from_sql_binary(oid, name, &bytes[0..16])?;
        let low = Point::from_sql_binary(oid, name, &bytes[16..32])?;
        Ok(Box2d { high, low })
    }
}

impl ToSqlValue for Box2d {
    fn natural_oid(&self) -> Oid {
        oid::BOX
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("({},{}),({},{})", self.high.x, self.high.y, self.low.x, self.low.y).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.high.encode_binary(oid, name, buf)?;
        self.low.encode_binary(oid, name, buf)
    }
}

impl<'a> FromSqlValue<'a> for Circle {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let nums = parse_floats(oid, name, text, &['<', '>', '(', ')'])?;
        match nums.as_slice() {
            [x, y, r] => Ok(Circle { center: Point { x: *x, y: *y }, radius: *r }),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected <(x,y),r>")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 24 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 24 bytes"));
        }
        let center = Point::from_sql_binary(oid, name, &bytes[0..16])?;
        let radius = wire::read_f64(oid, name, &bytes[16..24])?;
        Ok(Circle { center, radius })
    }
}

impl ToSqlValue for Circle {
    fn natural_oid(&self) -> Oid {
        oid::CIRCLE
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("<({},{}),{}>", self.center.x, self.center.y, self.radius).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        self.center.encode_binary(oid, name, buf)?;
        wire::put_f64(buf, self.radius);
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for Line {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let nums = parse_floats(oid, name, text, &['{', '}'])?;
        match nums.as_slice() {
            [a, b, c] => Ok(Line { a: *a, b: *b, c: *c }),
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected {a,b,c}")),
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() != 24 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 24 bytes"));
        }
        let a = wire::read_f64(oid, name, &bytes[0..8])?;
        let b = wire::read_f64(oid, name, &bytes[8..16])?;
        let c = wire::read_f64(oid, name, &bytes[16..24])?;
        Ok(Line { a, b, c })
    }
}

impl ToSqlValue for Line {
    fn natural_oid(&self) -> Oid {
        oid::LINE
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(format!("{{{},{},{}}}", self.a, self.b, self.c).as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_f64(buf, self.a);
        wire::put_f64(buf, self.b);
        wire::put_f64(buf, self.c);
        Ok(IsNull::No)
    }
}

fn parse_point_list(oid: Oid, name: Option<&str>, inner: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in inner.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(c);
                }
            }
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let nums = parse_floats(oid, name, &current, &[])?;
                    match nums.as_slice() {
                        [x, y] => points.push(Point { x: *x, y: *y }),
                        _ => return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected (x,y) points")),
                    }
                    current.clear();
                } else {
                    current.push(c);
                }
            }
            _ if depth >= 1 => current.push(c),
            _ => {}
        }
    }
    Ok(points)
}

impl<'a> FromSqlValue<'a> for Path {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let closed = !text.starts_with('[');
        let points = parse_point_list(oid, name, text)?;
        Ok(Path { points, closed })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 5 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated path header"));
        }
        let closed = bytes[0] != 0;
        let npoints = wire::read_i32(oid, name, &bytes[1..5])?;
        let npoints = usize::try_from(npoints).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative point count"))?;
        let body = &bytes[5..];
        if body.len() != npoints * 16 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "point count does not match payload length"));
        }
        let points = body.chunks_exact(16).map(|c| Point::from_sql_binary(oid, name, c)).collect::<Result<_>>()?;
        Ok(Path { points, closed })
    }
}

impl ToSqlValue for Path {
    fn natural_oid(&self) -> Oid {
        oid::PATH
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.push(if self.closed { b'(' } else { b'[' });
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            buf.extend_from_slice(format!("({},{})", p.x, p.y).as_bytes());
        }
        buf.push(if self.closed { b')' } else { b']' });
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.push(u8::from(self.closed));
        wire::put_i32(buf, i32::try_from(self.points.len()).map_err(|_| Error::overflow("path point count", "i32"))?);
        for p in &self.points {
            p.encode_binary(oid, name, buf)?;
        }
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for Polygon {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        Ok(Polygon { points: parse_point_list(oid, name, text)? })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated polygon header"));
        }
        let npoints = wire::read_i32(oid, name, &bytes[0..4])?;
        let npoints = usize::try_from(npoints).map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "negative point count"))?;
        let body = &bytes[4..];
        if body.len() != npoints * 16 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "point count does not match payload length"));
        }
        let points = body.chunks_exact(16).map(|c| Point::from_sql_binary(oid, name, c)).collect::<Result<_>>()?;
        Ok(Polygon { points })
    }
}

impl ToSqlValue for Polygon {
    fn natural_oid(&self) -> Oid {
        oid::POLYGON
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.push(b'(');
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            buf.extend_from_slice(format!("({},{})", p.x, p.y).as_bytes());
        }
        buf.push(b')');
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        wire::put_i32(buf, i32::try_from(self.points.len()).map_err(|_| Error::overflow("polygon point count", "i32"))?);
        for p in &self.points {
            p.encode_binary(oid, name, buf)?;
        }
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_text_round_trip() {
        let point = Point { x: 1.5, y: -2.5 };
        let mut buf = Vec::new();
        point.encode_text(oid::POINT, None, &mut buf).unwrap();
        assert_eq!(Point::from_sql_text(oid::POINT, None, &buf).unwrap(), point);
    }

    #[test]
    fn circle_binary_round_trip() {
        let circle = Circle { center: Point { x: 0.0, y: 0.0 }, radius: 5.0 };
        let mut buf = Vec::new();
        circle.encode_binary(oid::CIRCLE, None, &mut buf).unwrap();
        assert_eq!(Circle::from_sql_binary(oid::CIRCLE, None, &buf).unwrap(), circle);
    }

    #[test]
    fn polygon_binary_round_trip() {
        let polygon = Polygon { points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }, Point { x: 1.0, y: 0.0 }] };
        let mut buf = Vec::new();
        polygon.encode_binary(oid::POLYGON, None, &mut buf).unwrap();
        assert_eq!(Polygon::from_sql_binary(oid::POLYGON, None, &buf).unwrap(), polygon);
    }

    #[test]
    fn path_text_round_trip() {
        let path = Path { points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 2.0 }], closed: true };
        let mut buf = Vec::new();
        path.encode_text(oid::PATH, None, &mut buf).unwrap();
        assert_eq!(Path::from_sql_text(oid::PATH, None, &buf).unwrap(), path);
    }
}
