//! Type expression resolution: strip wrappers down to the declared base type

use syn::{GenericArgument, PathArguments, Type};

const POINTER_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc"];
const COLLECTION_WRAPPERS: &[&str] = &["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet"];

/// Base type plus the wrapper flags seen on the way down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub base: String,
    pub is_pointer: bool,
    pub is_collection: bool,
}

/// Resolve a field type. Pointer and collection flags are tracked
/// independently, so `Vec<Option<T>>` sets both and yields `T`.
pub fn resolve_type(ty: &Type) -> ResolvedType {
    let mut resolved = ResolvedType {
        base: String::new(),
        is_pointer: false,
        is_collection: false,
    };
    let base = unwrap(ty, &mut resolved);
    resolved.base = base;
    resolved
}

fn unwrap(ty: &Type, flags: &mut ResolvedType) -> String {
    match ty {
        Type::Reference(r) => {
            flags.is_pointer = true;
            unwrap(&r.elem, flags)
        }
        Type::Ptr(p) => {
            flags.is_pointer = true;
            unwrap(&p.elem, flags)
        }
        Type::Slice(s) => {
            flags.is_collection = true;
            unwrap(&s.elem, flags)
        }
        Type::Array(a) => {
            flags.is_collection = true;
            unwrap(&a.elem, flags)
        }
        Type::Paren(p) => unwrap(&p.elem, flags),
        Type::Group(g) => unwrap(&g.elem, flags),
        Type::Path(tp) => {
            let Some(last) = tp.path.segments.last() else {
                return String::new();
            };
            let ident = last.ident.to_string();

            let wrapper_flag = if POINTER_WRAPPERS.contains(&ident.as_str()) {
                Some(&mut flags.is_pointer)
            } else if COLLECTION_WRAPPERS.contains(&ident.as_str()) {
                Some(&mut flags.is_collection)
            } else {
                None
            };

            if let Some(flag) = wrapper_flag {
                if let Some(inner) = first_type_argument(&last.arguments) {
                    *flag = true;
                    return unwrap(inner, flags);
                }
            }

            tp.path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect::<Vec<_>>()
                .join("::")
        }
        Type::Tuple(t) if t.elems.is_empty() => "()".to_string(),
        _ => "unknown".to_string(),
    }
}

fn first_type_argument(args: &PathArguments) -> Option<&Type> {
    match args {
        PathArguments::AngleBracketed(ab) => ab.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}
