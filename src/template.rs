//! Base assembly template.
//!
//! The generated streams are spliced into a template that supplies the
//! runtime: an entry label, a halting loop after the program body, and the
//! six memory routines every load and store goes through. The routines take
//! the address in r11 and the value in r20 and return through r0.

/// Placeholder for the program body.
pub const CODE: &str = "{code}";

/// Placeholder for the function definitions.
pub const FUNC_CODE: &str = "{func_code}";

/// The default runtime template.
pub const BASE_TEMPLATE: &str = "\
.start
{code}
.halt
ldr r1, .halt
jpr r1
.lmemb
stb r20, r11
jpr r0
.lmemh
sth r20, r11
jpr r0
.lmemw
stw r20, r11
jpr r0
.cmemb
ldb r20, r11
jpr r0
.cmemh
ldh r20, r11
jpr r0
.cmemw
ldw r20, r11
jpr r0
{func_code}
";

/// Splice the body and function streams into `template`.
pub fn render(template: &str, code: &str, func_code: &str) -> String {
    template.replace(CODE, code).replace(FUNC_CODE, func_code)
}
