//! Parsing for PostScript charstrings.

use types::{Fixed, Pen};

use super::{dict::parse_int, BlendState, Error, Index, Stack};
use crate::{Cursor, FontData};

/// Maximum nesting depth for subroutine calls.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const NESTING_DEPTH_LIMIT: u32 = 10;

/// Trait for processing commands resulting from charstring evaluation.
///
/// The path construction operators are simplified into the basic move,
/// line, curve and close commands. Hint operators have empty default
/// implementations.
#[allow(unused_variables)]
pub trait CommandSink {
    fn move_to(&mut self, x: Fixed, y: Fixed);
    fn line_to(&mut self, x: Fixed, y: Fixed);
    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed);
    fn close(&mut self);
    /// Horizontal stem hint between the absolute edges `y0` and `y1`.
    fn hstem(&mut self, y0: Fixed, y1: Fixed) {}
    /// Vertical stem hint between the absolute edges `x0` and `x1`.
    fn vstem(&mut self, x0: Fixed, x1: Fixed) {}
    fn hint_mask(&mut self, mask: &[u8]) {}
    fn counter_mask(&mut self, mask: &[u8]) {}
}

/// Command sink that sends the results of charstring evaluation to a [Pen].
pub struct PenSink<'a, P>(&'a mut P);

impl<'a, P> PenSink<'a, P> {
    pub fn new(pen: &'a mut P) -> Self {
        Self(pen)
    }
}

impl<P: Pen> CommandSink for PenSink<'_, P> {
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.0.move_to(x.to_f32(), y.to_f32());
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.0.line_to(x.to_f32(), y.to_f32());
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.0.curve_to(
            cx0.to_f32(),
            cy0.to_f32(),
            cx1.to_f32(),
            cy1.to_f32(),
            x.to_f32(),
            y.to_f32(),
        );
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Evaluates the given charstring and emits the resulting commands to the
/// specified sink.
///
/// If the Private DICT associated with this charstring contains local
/// subroutines, then the `subrs` index must be provided, otherwise
/// `Error::MissingSubroutines` will be returned if a callsubr operator
/// is present.
///
/// If evaluating a CFF2 charstring and the top-level table contains an
/// item variation store, then `blend_state` must be provided, otherwise
/// `Error::MissingBlendState` will be returned if a blend operator is
/// present.
pub fn evaluate(
    charstring_data: &[u8],
    global_subrs: Index,
    subrs: Option<Index>,
    blend_state: Option<BlendState>,
    sink: &mut impl CommandSink,
) -> Result<(), Error> {
    let mut evaluator = Evaluator {
        global_subrs,
        subrs,
        blend_state,
        sink,
        is_open: false,
        have_read_width: false,
        stem_count: 0,
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        stack: Stack::new(),
    };
    evaluator.evaluate(charstring_data, 0)?;
    // a charstring without endchar (CFF2) still closes its last contour
    if evaluator.is_open {
        evaluator.sink.close();
    }
    Ok(())
}

/// Transient state for evaluating a charstring and handling recursive
/// subroutine calls.
struct Evaluator<'a, S> {
    global_subrs: Index<'a>,
    subrs: Option<Index<'a>>,
    blend_state: Option<BlendState<'a>>,
    sink: &'a mut S,
    is_open: bool,
    have_read_width: bool,
    stem_count: usize,
    x: Fixed,
    y: Fixed,
    stack: Stack,
}

impl<S: CommandSink> Evaluator<'_, S> {
    fn evaluate(&mut self, charstring_data: &[u8], nesting_depth: u32) -> Result<(), Error> {
        if nesting_depth > NESTING_DEPTH_LIMIT {
            return Err(Error::CharstringNestingDepthLimitExceeded);
        }
        let mut cursor = FontData::new(charstring_data).cursor();
        while !cursor.is_empty() {
            let b0 = cursor.read::<u8>()?;
            match b0 {
                // See "3.2 Charstring Number Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=12>
                28 | 32..=254 => {
                    self.stack.push(parse_int(&mut cursor, b0)?)?;
                }
                255 => {
                    let num = Fixed::from_bits(cursor.read::<i32>()?);
                    self.stack.push(num)?;
                }
                _ => {
                    let operator = Operator::read(&mut cursor, b0)?;
                    if !self.evaluate_operator(operator, &mut cursor, nesting_depth)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Consumes the leading width operand if this is the first stack
    /// clearing operator and the stack holds one more value than the
    /// operator expects.
    fn skip_width(&mut self, has_extra: bool) -> usize {
        if has_extra && !self.have_read_width {
            self.have_read_width = true;
            1
        } else {
            0
        }
    }

    fn begin_subpath(&mut self) {
        if self.is_open {
            self.sink.close();
        }
        self.is_open = true;
    }

    fn emit_curve(&mut self, x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed, x3: Fixed, y3: Fixed) {
        self.x = x3;
        self.y = y3;
        self.sink.curve_to(x1, y1, x2, y2, x3, y3);
    }

    /// Evaluates a single charstring operator.
    ///
    /// Returns `Ok(true)` if evaluation should continue.
    fn evaluate_operator(
        &mut self,
        operator: Operator,
        cursor: &mut Cursor,
        nesting_depth: u32,
    ) -> Result<bool, Error> {
        use Operator::*;
        match operator {
            // The flex operators are emitted as two curves regardless of
            // the flex depth.
            Flex => {
                let a = self.stack.get_fixed_array::<12>(0)?;
                let (x1, y1) = (self.x + a[0], self.y + a[1]);
                let (x2, y2) = (x1 + a[2], y1 + a[3]);
                let (x3, y3) = (x2 + a[4], y2 + a[5]);
                let (x4, y4) = (x3 + a[6], y3 + a[7]);
                let (x5, y5) = (x4 + a[8], y4 + a[9]);
                let (x6, y6) = (x5 + a[10], y5 + a[11]);
                self.emit_curve(x1, y1, x2, y2, x3, y3);
                self.emit_curve(x4, y4, x5, y5, x6, y6);
                self.stack.clear();
            }
            HFlex => {
                let a = self.stack.get_fixed_array::<7>(0)?;
                let y0 = self.y;
                let (x1, y1) = (self.x + a[0], y0);
                let (x2, y2) = (x1 + a[1], y1 + a[2]);
                let x3 = x2 + a[3];
                let x4 = x3 + a[4];
                let x5 = x4 + a[5];
                let x6 = x5 + a[6];
                self.emit_curve(x1, y1, x2, y2, x3, y2);
                self.emit_curve(x4, y2, x5, y0, x6, y0);
                self.stack.clear();
            }
            HFlex1 => {
                let a = self.stack.get_fixed_array::<9>(0)?;
                let y0 = self.y;
                let (x1, y1) = (self.x + a[0], y0 + a[1]);
                let (x2, y2) = (x1 + a[2], y1 + a[3]);
                let x3 = x2 + a[4];
                let x4 = x3 + a[5];
                let (x5, y5) = (x4 + a[6], y2 + a[7]);
                let x6 = x5 + a[8];
                self.emit_curve(x1, y1, x2, y2, x3, y2);
                self.emit_curve(x4, y2, x5, y5, x6, y0);
                self.stack.clear();
            }
            Flex1 => {
                let a = self.stack.get_fixed_array::<11>(0)?;
                let (x0, y0) = (self.x, self.y);
                let (x1, y1) = (x0 + a[0], y0 + a[1]);
                let (x2, y2) = (x1 + a[2], y1 + a[3]);
                let (x3, y3) = (x2 + a[4], y2 + a[5]);
                let (x4, y4) = (x3 + a[6], y3 + a[7]);
                let (x5, y5) = (x4 + a[8], y4 + a[9]);
                let (x6, y6) = if (x5 - x0).abs() > (y5 - y0).abs() {
                    (x5 + a[10], y0)
                } else {
                    (x0, y5 + a[10])
                };
                self.emit_curve(x1, y1, x2, y2, x3, y3);
                self.emit_curve(x4, y4, x5, y5, x6, y6);
                self.stack.clear();
            }
            // <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2charstr#syntax-for-font-variations-support-operators>
            VariationStoreIndex => {
                let blend_state = self.blend_state.as_mut().ok_or(Error::MissingBlendState)?;
                let store_index = self.stack.pop_i32()? as u16;
                blend_state.set_store_index(store_index)?;
            }
            Blend => {
                let blend_state = self.blend_state.as_ref().ok_or(Error::MissingBlendState)?;
                self.stack.apply_blend(blend_state)?;
            }
            Return => {
                return Ok(false);
            }
            EndChar => {
                if !self.stack.is_empty() && !self.have_read_width {
                    self.have_read_width = true;
                    self.stack.clear();
                }
                if self.is_open {
                    self.is_open = false;
                    self.sink.close();
                }
                return Ok(false);
            }
            HStem | VStem | HStemHm | VStemHm | HintMask | CntrMask => {
                let mut i = self.skip_width(self.stack.len_is_odd());
                let is_horizontal = matches!(operator, HStem | HStemHm);
                let mut u = Fixed::ZERO;
                while i + 1 < self.stack.len() {
                    let [du, w] = self.stack.get_fixed_array::<2>(i)?;
                    u += du;
                    let v = u.wrapping_add(w);
                    if is_horizontal {
                        self.sink.hstem(u, v);
                    } else {
                        self.sink.vstem(u, v);
                    }
                    self.stem_count += 1;
                    u = v;
                    i += 2;
                }
                if matches!(operator, HintMask | CntrMask) {
                    let mask = cursor.read_bytes(self.stem_count.div_ceil(8))?;
                    if operator == HintMask {
                        self.sink.hint_mask(mask);
                    } else {
                        self.sink.counter_mask(mask);
                    }
                }
                self.stack.clear();
            }
            RMoveTo => {
                let i = self.skip_width(self.stack.len() == 3);
                let [dx, dy] = self.stack.get_fixed_array::<2>(i)?;
                self.begin_subpath();
                self.x += dx;
                self.y += dy;
                self.sink.move_to(self.x, self.y);
                self.stack.clear();
            }
            HMoveTo | VMoveTo => {
                let i = self.skip_width(self.stack.len() == 2);
                let delta = self.stack.get_fixed(i)?;
                self.begin_subpath();
                if operator == HMoveTo {
                    self.x += delta;
                } else {
                    self.y += delta;
                }
                self.sink.move_to(self.x, self.y);
                self.stack.clear();
            }
            RLineTo => {
                let mut i = 0;
                while i + 1 < self.stack.len() {
                    let [dx, dy] = self.stack.get_fixed_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                    i += 2;
                }
                self.stack.clear();
            }
            HLineTo | VLineTo => {
                let mut is_x = operator == HLineTo;
                for i in 0..self.stack.len() {
                    let delta = self.stack.get_fixed(i)?;
                    if is_x {
                        self.x += delta;
                    } else {
                        self.y += delta;
                    }
                    is_x = !is_x;
                    self.sink.line_to(self.x, self.y);
                }
                self.stack.clear();
            }
            HhCurveTo => {
                let mut i = 0;
                if self.stack.len_is_odd() {
                    self.y += self.stack.get_fixed(0)?;
                    i = 1;
                }
                while i + 4 <= self.stack.len() {
                    let a = self.stack.get_fixed_array::<4>(i)?;
                    let (x1, y1) = (self.x + a[0], self.y);
                    let (x2, y2) = (x1 + a[1], y1 + a[2]);
                    self.emit_curve(x1, y1, x2, y2, x2 + a[3], y2);
                    i += 4;
                }
                self.stack.clear();
            }
            VvCurveTo => {
                let mut i = 0;
                if self.stack.len_is_odd() {
                    self.x += self.stack.get_fixed(0)?;
                    i = 1;
                }
                while i + 4 <= self.stack.len() {
                    let a = self.stack.get_fixed_array::<4>(i)?;
                    let (x1, y1) = (self.x, self.y + a[0]);
                    let (x2, y2) = (x1 + a[1], y1 + a[2]);
                    self.emit_curve(x1, y1, x2, y2, x2, y2 + a[3]);
                    i += 4;
                }
                self.stack.clear();
            }
            HvCurveTo | VhCurveTo => {
                let count = self.stack.len();
                let mut i = 0;
                let mut horizontal = operator == HvCurveTo;
                while i + 4 <= count {
                    let a = self.stack.get_fixed_array::<4>(i)?;
                    // the final curve may carry a fifth operand
                    let last = if count - i == 5 {
                        self.stack.get_fixed(i + 4)?
                    } else {
                        Fixed::ZERO
                    };
                    if horizontal {
                        let (x1, y1) = (self.x + a[0], self.y);
                        let (x2, y2) = (x1 + a[1], y1 + a[2]);
                        self.emit_curve(x1, y1, x2, y2, x2 + last, y2 + a[3]);
                    } else {
                        let (x1, y1) = (self.x, self.y + a[0]);
                        let (x2, y2) = (x1 + a[1], y1 + a[2]);
                        self.emit_curve(x1, y1, x2, y2, x2 + a[3], y2 + last);
                    }
                    horizontal = !horizontal;
                    i += 4;
                }
                self.stack.clear();
            }
            RrCurveTo | RCurveLine => {
                let count = self.stack.len();
                let mut i = 0;
                while i + 6 <= count {
                    let a = self.stack.get_fixed_array::<6>(i)?;
                    let (x1, y1) = (self.x + a[0], self.y + a[1]);
                    let (x2, y2) = (x1 + a[2], y1 + a[3]);
                    self.emit_curve(x1, y1, x2, y2, x2 + a[4], y2 + a[5]);
                    i += 6;
                }
                if operator == RCurveLine {
                    let [dx, dy] = self.stack.get_fixed_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                }
                self.stack.clear();
            }
            RLineCurve => {
                let count = self.stack.len();
                let mut i = 0;
                while i + 6 < count {
                    let [dx, dy] = self.stack.get_fixed_array::<2>(i)?;
                    self.x += dx;
                    self.y += dy;
                    self.sink.line_to(self.x, self.y);
                    i += 2;
                }
                let a = self.stack.get_fixed_array::<6>(i)?;
                let (x1, y1) = (self.x + a[0], self.y + a[1]);
                let (x2, y2) = (x1 + a[2], y1 + a[3]);
                self.emit_curve(x1, y1, x2, y2, x2 + a[4], y2 + a[5]);
                self.stack.clear();
            }
            CallSubr | CallGsubr => {
                let subrs_index = if operator == CallSubr {
                    self.subrs.as_ref().ok_or(Error::MissingSubroutines)?
                } else {
                    &self.global_subrs
                };
                let biased_index = self.stack.pop_i32()? + subrs_index.subr_bias();
                let biased_index =
                    usize::try_from(biased_index).map_err(|_| Error::InvalidStackAccess(0))?;
                let subr_charstring_data = subrs_index.get(biased_index)?;
                self.evaluate(subr_charstring_data, nesting_depth + 1)?;
            }
        }
        Ok(true)
    }
}

/// PostScript charstring operator.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2charstr#appendix-a-cff2-charstring-command-codes>
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    HStem,
    VStem,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RrCurveTo,
    CallSubr,
    Return,
    EndChar,
    VariationStoreIndex,
    Blend,
    HStemHm,
    HintMask,
    CntrMask,
    RMoveTo,
    HMoveTo,
    VStemHm,
    RCurveLine,
    RLineCurve,
    VvCurveTo,
    HhCurveTo,
    CallGsubr,
    VhCurveTo,
    HvCurveTo,
    HFlex,
    Flex,
    HFlex1,
    Flex1,
}

impl Operator {
    fn read(cursor: &mut Cursor, b0: u8) -> Result<Self, Error> {
        use Operator::*;
        // Escape opcode for accessing two byte operators
        const ESCAPE: u8 = 12;
        if b0 == ESCAPE {
            let b1 = cursor.read::<u8>()?;
            return Ok(match b1 {
                34 => HFlex,
                35 => Flex,
                36 => HFlex1,
                37 => Flex1,
                _ => return Err(Error::InvalidCharstringOperator(b1)),
            });
        }
        Ok(match b0 {
            1 => HStem,
            3 => VStem,
            4 => VMoveTo,
            5 => RLineTo,
            6 => HLineTo,
            7 => VLineTo,
            8 => RrCurveTo,
            10 => CallSubr,
            11 => Return,
            14 => EndChar,
            15 => VariationStoreIndex,
            16 => Blend,
            18 => HStemHm,
            19 => HintMask,
            20 => CntrMask,
            21 => RMoveTo,
            22 => HMoveTo,
            23 => VStemHm,
            24 => RCurveLine,
            25 => RLineCurve,
            26 => VvCurveTo,
            27 => HhCurveTo,
            29 => CallGsubr,
            30 => VhCurveTo,
            31 => HvCurveTo,
            _ => return Err(Error::InvalidCharstringOperator(b0)),
        })
    }
}
