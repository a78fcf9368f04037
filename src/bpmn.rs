//! BPMN type hierarchy and the morph relation
//!
//! Template applicability needs subtype queries over the process-modeling
//! type system. The [`TypeOracle`] trait is the seam; [`BpmnHierarchy`]
//! answers it from a static table covering the slice of the BPMN
//! metamodel that element templates bind to.

/// Subtype oracle over process-modeling type names
pub trait TypeOracle {
    /// Whether `type_name` is `base_type` or one of its subtypes
    fn is_instance_of(&self, type_name: &str, base_type: &str) -> bool;
}

/// Child to parent pairs for the BPMN slice relevant to templates.
/// One parent per type; the metamodel's mixin supertypes are not needed
/// for template checks.
static SUPERTYPES: &[(&str, &str)] = &[
    ("bpmn:FlowElement", "bpmn:BaseElement"),
    ("bpmn:FlowNode", "bpmn:FlowElement"),
    ("bpmn:SequenceFlow", "bpmn:FlowElement"),
    ("bpmn:DataObjectReference", "bpmn:FlowElement"),
    ("bpmn:DataStoreReference", "bpmn:FlowElement"),
    // activities
    ("bpmn:Activity", "bpmn:FlowNode"),
    ("bpmn:Task", "bpmn:Activity"),
    ("bpmn:ServiceTask", "bpmn:Task"),
    ("bpmn:UserTask", "bpmn:Task"),
    ("bpmn:SendTask", "bpmn:Task"),
    ("bpmn:ReceiveTask", "bpmn:Task"),
    ("bpmn:ManualTask", "bpmn:Task"),
    ("bpmn:BusinessRuleTask", "bpmn:Task"),
    ("bpmn:ScriptTask", "bpmn:Task"),
    ("bpmn:SubProcess", "bpmn:Activity"),
    ("bpmn:CallActivity", "bpmn:Activity"),
    // events
    ("bpmn:Event", "bpmn:FlowNode"),
    ("bpmn:CatchEvent", "bpmn:Event"),
    ("bpmn:ThrowEvent", "bpmn:Event"),
    ("bpmn:StartEvent", "bpmn:CatchEvent"),
    ("bpmn:BoundaryEvent", "bpmn:CatchEvent"),
    ("bpmn:IntermediateCatchEvent", "bpmn:CatchEvent"),
    ("bpmn:EndEvent", "bpmn:ThrowEvent"),
    ("bpmn:IntermediateThrowEvent", "bpmn:ThrowEvent"),
    // gateways
    ("bpmn:Gateway", "bpmn:FlowNode"),
    ("bpmn:ExclusiveGateway", "bpmn:Gateway"),
    ("bpmn:ParallelGateway", "bpmn:Gateway"),
    ("bpmn:InclusiveGateway", "bpmn:Gateway"),
    ("bpmn:ComplexGateway", "bpmn:Gateway"),
    ("bpmn:EventBasedGateway", "bpmn:Gateway"),
    // containers
    ("bpmn:RootElement", "bpmn:BaseElement"),
    ("bpmn:CallableElement", "bpmn:RootElement"),
    ("bpmn:Process", "bpmn:CallableElement"),
    ("bpmn:Participant", "bpmn:BaseElement"),
    ("bpmn:Collaboration", "bpmn:RootElement"),
];

/// Static BPMN type hierarchy
#[derive(Debug, Default, Clone, Copy)]
pub struct BpmnHierarchy;

impl BpmnHierarchy {
    /// Create the hierarchy oracle
    pub fn new() -> Self {
        Self
    }

    fn parent_of(type_name: &str) -> Option<&'static str> {
        SUPERTYPES
            .iter()
            .find(|(child, _)| *child == type_name)
            .map(|(_, parent)| *parent)
    }
}

impl TypeOracle for BpmnHierarchy {
    fn is_instance_of(&self, type_name: &str, base_type: &str) -> bool {
        let mut current = type_name;
        loop {
            if current == base_type {
                return true;
            }
            match Self::parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}

/// Base categories a node type can morph within
pub const MORPHABLE_TYPES: [&str; 3] = ["bpmn:Task", "bpmn:Event", "bpmn:Gateway"];

/// Whether a node of `source_type` can morph into `target_type`
///
/// A type always morphs into itself. Otherwise the source must fall into
/// one of the [`MORPHABLE_TYPES`] categories and the target must belong
/// to the same category; types outside every category morph into
/// nothing, and morphing never crosses categories.
pub fn can_morph(oracle: &dyn TypeOracle, source_type: &str, target_type: &str) -> bool {
    if source_type == target_type {
        return true;
    }

    let base = MORPHABLE_TYPES
        .iter()
        .find(|base| oracle.is_instance_of(source_type, base));

    match base {
        Some(base) => oracle.is_instance_of(target_type, base),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_instance_of_direct_subtype() {
        let oracle = BpmnHierarchy::new();
        assert!(oracle.is_instance_of("bpmn:ServiceTask", "bpmn:Task"));
        assert!(oracle.is_instance_of("bpmn:ExclusiveGateway", "bpmn:Gateway"));
    }

    #[test]
    fn test_is_instance_of_transitive() {
        let oracle = BpmnHierarchy::new();
        assert!(oracle.is_instance_of("bpmn:ServiceTask", "bpmn:Activity"));
        assert!(oracle.is_instance_of("bpmn:StartEvent", "bpmn:Event"));
        assert!(oracle.is_instance_of("bpmn:EndEvent", "bpmn:FlowNode"));
        assert!(oracle.is_instance_of("bpmn:Process", "bpmn:BaseElement"));
    }

    #[test]
    fn test_is_instance_of_reflexive() {
        let oracle = BpmnHierarchy::new();
        assert!(oracle.is_instance_of("bpmn:Task", "bpmn:Task"));
        assert!(oracle.is_instance_of("bpmn:Unknown", "bpmn:Unknown"));
    }

    #[test]
    fn test_is_instance_of_rejects_unrelated() {
        let oracle = BpmnHierarchy::new();
        assert!(!oracle.is_instance_of("bpmn:ServiceTask", "bpmn:Event"));
        assert!(!oracle.is_instance_of("bpmn:Task", "bpmn:ServiceTask"));
        assert!(!oracle.is_instance_of("bpmn:Foo", "bpmn:Task"));
    }

    #[test]
    fn test_can_morph_within_category() {
        let oracle = BpmnHierarchy::new();
        assert!(can_morph(&oracle, "bpmn:ServiceTask", "bpmn:UserTask"));
        assert!(can_morph(&oracle, "bpmn:StartEvent", "bpmn:EndEvent"));
        assert!(can_morph(&oracle, "bpmn:ExclusiveGateway", "bpmn:ParallelGateway"));
    }

    #[test]
    fn test_can_morph_rejects_cross_category() {
        let oracle = BpmnHierarchy::new();
        assert!(!can_morph(&oracle, "bpmn:ServiceTask", "bpmn:StartEvent"));
        assert!(!can_morph(&oracle, "bpmn:EventBasedGateway", "bpmn:UserTask"));
    }

    #[test]
    fn test_can_morph_rejects_uncategorized_types() {
        let oracle = BpmnHierarchy::new();
        assert!(!can_morph(&oracle, "bpmn:Foo", "bpmn:Bar"));
        assert!(!can_morph(&oracle, "bpmn:SequenceFlow", "bpmn:ServiceTask"));
        assert!(!can_morph(&oracle, "bpmn:Process", "bpmn:Process2"));
    }

    #[test]
    fn test_can_morph_identity() {
        let oracle = BpmnHierarchy::new();
        assert!(can_morph(&oracle, "bpmn:ServiceTask", "bpmn:ServiceTask"));
        // identity holds even for types outside every category
        assert!(can_morph(&oracle, "bpmn:Foo", "bpmn:Foo"));
    }

    #[test]
    fn test_can_morph_base_into_subtype() {
        let oracle = BpmnHierarchy::new();
        assert!(can_morph(&oracle, "bpmn:Task", "bpmn:ServiceTask"));
        assert!(can_morph(&oracle, "bpmn:Event", "bpmn:BoundaryEvent"));
    }
}
