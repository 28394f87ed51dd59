use crate::value::{Native, Value};
use crate::Vm;
use rand::prelude::*;
use std::io::stdin;
use std::process;

/// The standard library, installed into the globals map through
/// `register_native` before execution.
pub const NATIVES: [(&str, Native); 37] = [
    ("اطبع", print),
    ("ادخل", input),
    ("الوقت", clock),
    ("النوع", type_of),
    ("الطول", len),
    ("المدى", range),
    ("صحيح", to_int),
    ("عشري", to_float),
    ("نص", to_string),
    ("اخرج", exit),
    ("قيمة_مطلقة", abs),
    ("جذر", sqrt),
    ("أس", power),
    ("أرض", floor),
    ("سقف", ceil),
    ("تقريب", round),
    ("أصغر", min),
    ("أكبر", max),
    ("عشوائي", random),
    ("حرف", chr),
    ("ترميز", ord),
    ("قسم", split),
    ("اربط", join),
    ("كبير", upper),
    ("صغير", lower),
    ("تقليم", trim),
    ("استبدل", replace),
    ("ابحث", find),
    ("أضف", push),
    ("اسحب", pop),
    ("امسح", clear),
    ("رتب", sort),
    ("اعكس", reverse),
    ("انسخ", copy),
    ("المفاتيح", keys),
    ("القيم", values),
    ("الأزواج", items),
];

fn print(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    let line = (0..argc)
        .map(|idx| vm.arg(argc, idx).to_string())
        .collect::<Vec<_>>()
        .join(" ");
    vm.write_line(&line)?;
    Ok(Value::Null)
}

fn input(_: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(0, argc)?;
    let mut line = String::new();
    stdin()
        .read_line(&mut line)
        .map_err(|err| format!("خطأ في القراءة: {err}"))?;
    Ok(Value::new_string(line.trim_end_matches('\n').to_string()))
}

fn clock(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(0, argc)?;
    Ok(Value::Float(vm.elapsed_seconds()))
}

fn type_of(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::new_string(vm.arg(argc, 0).type_name().to_string()))
}

fn len(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    use crate::value::Object;
    match vm.arg(argc, 0) {
        Value::Object(Object::Str(string)) => Ok(Value::Int(string.chars().count() as i64)),
        Value::Object(Object::List(items)) => Ok(Value::Int(items.borrow().len() as i64)),
        Value::Object(Object::Dict(entries)) => Ok(Value::Int(entries.borrow().len() as i64)),
        _ => Err("يجب أن يكون المدخل نصاً أو قائمة أو قاموساً".to_string()),
    }
}

fn range(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    let (start, end, step) = match argc {
        1 => (0, vm.arg_int(argc, 0)?, 1),
        2 => (vm.arg_int(argc, 0)?, vm.arg_int(argc, 1)?, 1),
        3 => {
            let step = vm.arg_int(argc, 2)?;
            if step == 0 {
                return Err("لا يمكن أن تكون الخطوة صفراً".to_string());
            }
            (vm.arg_int(argc, 0)?, vm.arg_int(argc, 1)?, step)
        }
        _ => return Err(format!("توقعت من 1 إلى 3 من المدخلات ولكن حصلت على {argc}")),
    };

    let mut items = vec![];
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        items.push(Value::Int(current));
        current += step;
    }
    Ok(Value::new_list(items))
}

fn to_int(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    match vm.arg(argc, 0) {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(n) => Ok(Value::Int(n.trunc() as i64)),
        Value::Bool(value) => Ok(Value::Int(*value as i64)),
        value => match value.as_str() {
            Some(string) => string
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("{string} ليس عدداً صحيحاً")),
            None => Err("يجب أن يكون المدخل عدداً أو نصاً".to_string()),
        },
    }
}

fn to_float(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    match vm.arg(argc, 0) {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(n) => Ok(Value::Float(*n)),
        value => match value.as_str() {
            Some(string) => string
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("{string} ليس عدداً")),
            None => Err("يجب أن يكون المدخل عدداً أو نصاً".to_string()),
        },
    }
}

fn to_string(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::new_string(vm.arg(argc, 0).to_string()))
}

fn exit(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    let code = match argc {
        0 => 0,
        1 => vm.arg_int(argc, 0)?,
        _ => return Err(format!("توقعت 0 أو 1 من المدخلات ولكن حصلت على {argc}")),
    };
    process::exit(code as i32);
}

fn abs(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    match vm.arg(argc, 0) {
        Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        _ => Err("يجب أن يكون المدخل عدداً".to_string()),
    }
}

fn sqrt(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let n = vm.arg_number(argc, 0)?;
    if n < 0.0 {
        return Err("لا يمكن حساب جذر عدد سالب".to_string());
    }
    Ok(Value::Float(n.sqrt()))
}

fn power(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(2, argc)?;
    let base = vm.arg_number(argc, 0)?;
    let exponent = vm.arg_number(argc, 1)?;
    Ok(Value::Float(base.powf(exponent)))
}

fn floor(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::Int(vm.arg_number(argc, 0)?.floor() as i64))
}

fn ceil(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::Int(vm.arg_number(argc, 0)?.ceil() as i64))
}

fn round(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::Int(vm.arg_number(argc, 0)?.round() as i64))
}

fn min(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    if argc == 0 {
        return Err("توقعت مدخلاً واحداً على الأقل".to_string());
    }
    let mut best = vm.arg(argc, 0).clone();
    for idx in 1..argc {
        let candidate = vm.arg(argc, idx);
        match candidate.compare(&best) {
            Some(std::cmp::Ordering::Less) => best = candidate.clone(),
            Some(_) => {}
            None => return Err("لا يمكن مقارنة المدخلات".to_string()),
        }
    }
    Ok(best)
}

fn max(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    if argc == 0 {
        return Err("توقعت مدخلاً واحداً على الأقل".to_string());
    }
    let mut best = vm.arg(argc, 0).clone();
    for idx in 1..argc {
        let candidate = vm.arg(argc, idx);
        match candidate.compare(&best) {
            Some(std::cmp::Ordering::Greater) => best = candidate.clone(),
            Some(_) => {}
            None => return Err("لا يمكن مقارنة المدخلات".to_string()),
        }
    }
    Ok(best)
}

fn random(_: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(0, argc)?;
    let mut rng = rand::thread_rng();
    Ok(Value::Float(rng.gen::<f64>()))
}

fn chr(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let code = vm.arg_int(argc, 0)?;
    match u32::try_from(code).ok().and_then(char::from_u32) {
        Some(c) => Ok(Value::new_string(c.to_string())),
        None => Err(format!("لا يوجد حرف مقترن بالرقم {code}")),
    }
}

fn ord(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let string = vm.arg_str(argc, 0)?;
    let mut chars = string.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Int(c as i64)),
        _ => Err("يجب أن يكون المدخل نصاً من حرف واحد".to_string()),
    }
}

fn split(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(2, argc)?;
    let string = vm.arg_str(argc, 0)?;
    let delim = vm.arg_str(argc, 1)?;
    let parts = if delim.is_empty() {
        string
            .chars()
            .map(|c| Value::new_string(c.to_string()))
            .collect()
    } else {
        string
            .split(delim.as_str())
            .map(|part| Value::new_string(part.to_string()))
            .collect()
    };
    Ok(Value::new_list(parts))
}

fn join(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(2, argc)?;
    let items = vm.arg_list(argc, 0)?;
    let sep = vm.arg_str(argc, 1)?;
    let joined = items
        .borrow()
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(&sep);
    Ok(Value::new_string(joined))
}

fn upper(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::new_string(vm.arg_str(argc, 0)?.to_uppercase()))
}

fn lower(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::new_string(vm.arg_str(argc, 0)?.to_lowercase()))
}

fn trim(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    Ok(Value::new_string(vm.arg_str(argc, 0)?.trim().to_string()))
}

fn replace(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(3, argc)?;
    let string = vm.arg_str(argc, 0)?;
    let old = vm.arg_str(argc, 1)?;
    let new = vm.arg_str(argc, 2)?;
    Ok(Value::new_string(string.replace(old.as_str(), &new)))
}

/// Character index of the first occurrence, or `-1`.
fn find(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(2, argc)?;
    let string = vm.arg_str(argc, 0)?;
    let needle = vm.arg_str(argc, 1)?;
    match string.find(needle.as_str()) {
        Some(byte_idx) => Ok(Value::Int(string[..byte_idx].chars().count() as i64)),
        None => Ok(Value::Int(-1)),
    }
}

fn push(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    if argc < 2 {
        return Err("توقعت مدخلين على الأقل".to_string());
    }
    let items = vm.arg_list(argc, 0)?;
    for idx in 1..argc {
        items.borrow_mut().push(vm.arg(argc, idx).clone());
    }
    Ok(Value::Null)
}

fn pop(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let items = vm.arg_list(argc, 0)?;
    let popped = items.borrow_mut().pop();
    match popped {
        Some(item) => Ok(item),
        None => Err("لا يوجد عنصر لإزالته".to_string()),
    }
}

fn clear(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    use crate::value::Object;
    match vm.arg(argc, 0) {
        Value::Object(Object::List(items)) => items.borrow_mut().clear(),
        Value::Object(Object::Dict(entries)) => entries.borrow_mut().clear(),
        _ => return Err("يجب أن يكون المدخل قائمة أو قاموساً".to_string()),
    }
    Ok(Value::Null)
}

fn sort(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let items = vm.arg_list(argc, 0)?;
    let mut sorted = items.borrow().clone();
    for window in sorted.windows(2) {
        if window[0].compare(&window[1]).is_none() {
            return Err("لا يمكن ترتيب قائمة من أنواع مختلطة".to_string());
        }
    }
    sorted.sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));
    *items.borrow_mut() = sorted;
    Ok(Value::Null)
}

fn reverse(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let items = vm.arg_list(argc, 0)?;
    items.borrow_mut().reverse();
    Ok(Value::Null)
}

fn copy(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    use crate::value::Object;
    match vm.arg(argc, 0) {
        Value::Object(Object::List(items)) => Ok(Value::new_list(items.borrow().clone())),
        Value::Object(Object::Dict(entries)) => Ok(Value::new_dict(entries.borrow().clone())),
        _ => Err("يجب أن يكون المدخل قائمة أو قاموساً".to_string()),
    }
}

fn keys(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let entries = vm.arg_dict(argc, 0)?;
    let keys = entries
        .borrow()
        .keys()
        .map(|key| Value::new_string(key.clone()))
        .collect();
    Ok(Value::new_list(keys))
}

fn values(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let entries = vm.arg_dict(argc, 0)?;
    let values = entries.borrow().values().cloned().collect();
    Ok(Value::new_list(values))
}

fn items(vm: &mut Vm, argc: usize) -> Result<Value, String> {
    Vm::check_arity(1, argc)?;
    let entries = vm.arg_dict(argc, 0)?;
    let pairs = entries
        .borrow()
        .iter()
        .map(|(key, value)| {
            Value::new_list(vec![Value::new_string(key.clone()), value.clone()])
        })
        .collect();
    Ok(Value::new_list(pairs))
}
