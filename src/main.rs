fn main() {
    todo_lib::run()
}
