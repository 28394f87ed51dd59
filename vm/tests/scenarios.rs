// End-to-end tests: complete SEEKEP programs through the public
// lexer → parser → compiler → VM pipeline, asserting on program output.

use compiler::Compiler;
use lexer::Lexer;
use parser::Parser;
use std::{cell::RefCell, io::Write, rc::Rc};
use vm::Vm;

#[derive(Clone, Default)]
struct Sink(Rc<RefCell<Vec<u8>>>);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn run(source: &str) -> Result<String, String> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|errors| errors[0].to_string())?;
    let ast = Parser::new(tokens)
        .parse()
        .map_err(|errors| errors[0].to_string())?;
    let proto = Compiler::new(&ast)
        .compile()
        .map_err(|errors| errors[0].to_string())?;

    let sink = Sink::default();
    let mut vm = Vm::with_output(Box::new(sink.clone()));
    vm.run(proto).map_err(|err| err.to_string())?;
    let bytes = sink.0.borrow().clone();
    Ok(String::from_utf8(bytes).unwrap())
}

fn output(source: &str) -> String {
    match run(source) {
        Ok(output) => output,
        Err(err) => panic!("التنفيذ فشل: {err}"),
    }
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(output("متغير س = 1 + 2 * 3؛ اطبع(س)؛"), "7\n");
}

#[test]
fn recursive_fibonacci() {
    let source = "
        دالة فيب(ن) {
            إذا (ن < 2) { أرجع ن؛ }
            أرجع فيب(ن - 1) + فيب(ن - 2)؛
        }
        اطبع(فيب(10))؛
    ";
    assert_eq!(output(source), "55\n");
}

#[test]
fn closure_counter() {
    let source = "
        دالة منشئ() {
            متغير ع = 0؛
            أرجع دالة() {
                ع = ع + 1؛
                أرجع ع؛
            }؛
        }
        متغير عداد = منشئ()؛
        اطبع(عداد())؛
        اطبع(عداد())؛
        اطبع(عداد())؛
    ";
    assert_eq!(output(source), "1\n2\n3\n");
}

#[test]
fn inherited_method() {
    let source = "
        صنف أ {
            حيي() { اطبع(\"أ\")؛ }
        }
        صنف ب: أ {}
        (جديد ب()).حيي()؛
    ";
    assert_eq!(output(source), "أ\n");
}

#[test]
fn child_method_overrides_parent() {
    let source = "
        صنف أ { من() { أرجع \"أ\"؛ } }
        صنف ب: أ { من() { أرجع \"ب\"؛ } }
        اطبع((جديد ب()).من())؛
    ";
    assert_eq!(output(source), "ب\n");
}

#[test]
fn list_indexing() {
    assert_eq!(
        output("متغير عناصر = [3، 1، 2]؛ اطبع(عناصر[0] + عناصر[1] + عناصر[2])؛"),
        "6\n"
    );
}

#[test]
fn while_loop() {
    assert_eq!(
        output("متغير س = 0؛ أثناء (س < 3) { اطبع(س)؛ س = س + 1؛ }"),
        "0\n1\n2\n"
    );
}

#[test]
fn for_loop_with_increment() {
    assert_eq!(
        output("لكل (متغير س = 0؛ س < 3؛ س++) { اطبع(س)؛ }"),
        "0\n1\n2\n"
    );
}

#[test]
fn break_and_continue() {
    let source = "
        لكل (متغير س = 0؛ س < 5؛ س++) {
            إذا (س == 1) { استمر؛ }
            إذا (س == 3) { توقف؛ }
            اطبع(س)؛
        }
    ";
    assert_eq!(output(source), "0\n2\n");
}

#[test]
fn foreach_over_list() {
    let source = "
        متغير مجموع = 0؛
        لكل (س في [1، 2، 3]) { مجموع += س؛ }
        اطبع(مجموع)؛
    ";
    assert_eq!(output(source), "6\n");
}

#[test]
fn foreach_over_string_and_dict() {
    let source = "
        لكل (حرف في \"أب\") { اطبع(حرف)؛ }
        لكل (مفتاح في {\"س\": 1، \"ص\": 2}) { اطبع(مفتاح)؛ }
    ";
    assert_eq!(output(source), "أ\nب\nس\nص\n");
}

#[test]
fn dict_literal_and_length() {
    let source = "
        متغير سجل = {\"أ\": 1، \"ب\": 2}؛
        اطبع(سجل[\"أ\"] + سجل[\"ب\"])؛
        اطبع(الطول(سجل))؛
        سجل[\"ج\"] = 3؛
        اطبع(الطول(سجل))؛
    ";
    assert_eq!(output(source), "3\n2\n3\n");
}

#[test]
fn constructor_returns_instance() {
    let source = "
        صنف نقطة {
            init(س، ص) {
                هذا.س = س؛
                هذا.ص = ص؛
            }
            مجموع() { أرجع هذا.س + هذا.ص؛ }
        }
        متغير ن = جديد نقطة(3، 4)؛
        اطبع(ن.مجموع())؛
        اطبع(ن.س)؛
    ";
    assert_eq!(output(source), "7\n3\n");
}

#[test]
fn closed_upvalues_stay_shared() {
    let source = "
        متغير حاصل = فارغ؛
        {
            متغير س = 1؛
            دالة اجلب() { أرجع س؛ }
            دالة اضبط(ق) { س = ق؛ }
            حاصل = [اجلب، اضبط]؛
        }
        حاصل[1](5)؛
        اطبع(حاصل[0]())؛
    ";
    assert_eq!(output(source), "5\n");
}

#[test]
fn short_circuit_skips_rhs() {
    let source = "
        دالة فشل() { أرجع 1 / 0؛ }
        اطبع(خطأ && فشل())؛
        اطبع(صحيح || فشل())؛
    ";
    assert_eq!(output(source), "خطأ\nصحيح\n");
}

#[test]
fn ternary_and_logic() {
    assert_eq!(output("اطبع(صحيح ؟ 1 : 2)؛"), "1\n");
    assert_eq!(output("اطبع(!!3 == صحيح)؛"), "صحيح\n");
}

#[test]
fn string_operations() {
    assert_eq!(output("اطبع(\"أب\" + \"ج\")؛"), "أبج\n");
    assert_eq!(output("اطبع(\"أ\" < \"ب\")؛"), "صحيح\n");
    assert_eq!(output("اطبع(\"أب\" * 2)؛"), "أبأب\n");
}

#[test]
fn bitwise_operations() {
    assert_eq!(output("اطبع(5 & 3)؛"), "1\n");
    assert_eq!(output("اطبع(1 << 3)؛"), "8\n");
    assert_eq!(output("اطبع(~0)؛"), "-1\n");
}

#[test]
fn compound_assignment() {
    assert_eq!(output("متغير س = 10؛ س -= 4؛ اطبع(س)؛"), "6\n");
}

#[test]
fn int_float_arithmetic() {
    assert_eq!(output("اطبع(7 / 2)؛"), "3.5\n");
    assert_eq!(output("اطبع(1 + 2.5)؛"), "3.5\n");
    assert_eq!(output("اطبع(7 % 3)؛"), "1\n");
    assert_eq!(output("اطبع(2 ** 10)؛"), "1024\n");
}

#[test]
fn conversions_round_trip() {
    assert_eq!(output("اطبع(صحيح(نص(42)))؛"), "42\n");
    assert_eq!(output("اطبع(صحيح(\"12\") + 1)؛"), "13\n");
}

#[test]
fn stdlib_helpers() {
    assert_eq!(output("اطبع(الطول(\"أبج\"))؛"), "3\n");
    assert_eq!(output("اطبع(المدى(1، 4))؛"), "[1، 2، 3]\n");
    assert_eq!(
        output("متغير ق = [3، 1، 2]؛ رتب(ق)؛ اطبع(ق)؛"),
        "[1، 2، 3]\n"
    );
    assert_eq!(output("اطبع(اربط([1، 2]، \"-\"))؛"), "1-2\n");
}

#[test]
fn global_redefinition_is_allowed() {
    assert_eq!(output("متغير أ = 1؛ متغير أ = 2؛ اطبع(أ)؛"), "2\n");
}

#[test]
fn undefined_global_errors() {
    let err = run("اطبع(غير_معروف)؛").unwrap_err();
    assert!(err.contains("متغير عام غير معروف"), "{err}");
}

#[test]
fn non_callable_errors() {
    let err = run("3()؛").unwrap_err();
    assert!(err.contains("استدعاء"), "{err}");
}

#[test]
fn index_out_of_bounds_errors() {
    let err = run("متغير ق = [1، 2]؛ ق[5]؛").unwrap_err();
    assert!(err.contains("لا يوجد عنصر"), "{err}");
}

#[test]
fn division_by_zero_errors() {
    let err = run("1 / 0؛").unwrap_err();
    assert!(err.contains("القسمة على صفر"), "{err}");
}

#[test]
fn deep_recursion_overflows_frames() {
    let err = run("دالة د() { أرجع د()؛ } د()؛").unwrap_err();
    assert!(err.contains("عمق الاستدعاء"), "{err}");
}

#[test]
fn mixed_addition_errors() {
    let err = run("\"س\" + 1؛").unwrap_err();
    assert!(err.contains("الجمع"), "{err}");
}

#[test]
fn negative_indices_count_from_the_end() {
    assert_eq!(output("اطبع([1، 2، 3][-1])؛"), "3\n");
}
